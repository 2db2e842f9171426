use crate::core::{BoundingBox, PointRecord, PointStore, StoreSession};
use crate::utils::error::{ProximityError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Row, TypeInfo, ValueRef};

pub const DEFAULT_TABLE: &str = "park";

/// Point store backed by a SQLite database file. Each session opens its own
/// read-only connection and closes it when dropped.
#[derive(Debug, Clone)]
pub struct SqlitePointStore {
    path: String,
    table: String,
}

impl SqlitePointStore {
    pub fn new(path: impl Into<String>, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self {
            path: path.into(),
            table,
        })
    }
}

impl PointStore for SqlitePointStore {
    type Session = SqliteSession;

    async fn acquire(&self) -> Result<Self::Session> {
        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .connect()
            .await
            .map_err(|e| {
                ProximityError::storage(format!("cannot open database {}: {}", self.path, e))
            })?;

        tracing::trace!("Opened SQLite session on {}", self.path);
        Ok(SqliteSession {
            conn,
            sql: format!(
                "SELECT * FROM \"{}\" WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4",
                self.table
            ),
            path: self.path.clone(),
        })
    }
}

pub struct SqliteSession {
    conn: SqliteConnection,
    sql: String,
    path: String,
}

#[async_trait]
impl StoreSession for SqliteSession {
    async fn range_query(&mut self, bounds: &BoundingBox) -> Result<Vec<PointRecord>> {
        let rows = sqlx::query(&self.sql)
            .bind(bounds.min_lat)
            .bind(bounds.max_lat)
            .bind(bounds.min_lon)
            .bind(bounds.max_lon)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ProximityError::storage(format!("range query failed: {}", e)))?;

        rows.iter().map(row_to_record).collect()
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        tracing::trace!("Released SQLite session on {}", self.path);
    }
}

/// Copies every column of a row, in column order, using the storage class of
/// the value actually stored.
fn row_to_record(row: &SqliteRow) -> Result<PointRecord> {
    let mut data = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index).map_err(decode_error)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(index).map_err(decode_error)?),
                "REAL" => {
                    let f = row.try_get::<f64, _>(index).map_err(decode_error)?;
                    serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
                }
                "BLOB" => Value::from(row.try_get::<Vec<u8>, _>(index).map_err(decode_error)?),
                _ => Value::String(row.try_get::<String, _>(index).map_err(decode_error)?),
            }
        };
        data.insert(column.name().to_string(), value);
    }
    Ok(PointRecord::new(data))
}

fn decode_error(e: sqlx::Error) -> ProximityError {
    ProximityError::storage(format!("cannot decode database row: {}", e))
}

pub(crate) fn validate_table_name(table: &str) -> Result<()> {
    let valid = table
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ProximityError::InvalidConfigValueError {
            field: "store.table".to_string(),
            value: table.to_string(),
            reason: "must be a plain SQL identifier (letters, digits, underscores)".to_string(),
        });
    }
    Ok(())
}
