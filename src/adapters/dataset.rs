use crate::adapters::memory::MemorySession;
use crate::core::{PointRecord, PointStore, Storage};
use crate::utils::error::{ProximityError, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        crate::utils::validation::validate_file_extension("store.path", path, &["csv", "json"])?;
        if path.to_ascii_lowercase().ends_with(".csv") {
            Ok(DatasetFormat::Csv)
        } else {
            Ok(DatasetFormat::Json)
        }
    }
}

/// Point store backed by a dataset file (CSV with a header row, or a JSON array
/// of objects). Each session loads a fresh snapshot, so edits to the file are
/// picked up by the next search.
#[derive(Debug, Clone)]
pub struct DatasetPointStore<S: Storage> {
    storage: S,
    path: String,
    format: DatasetFormat,
}

impl<S: Storage> DatasetPointStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let format = DatasetFormat::from_path(&path)?;
        Ok(Self {
            storage,
            path,
            format,
        })
    }

    async fn load(&self) -> Result<Vec<PointRecord>> {
        let bytes = self.storage.read_file(&self.path).await?;
        let records = match self.format {
            DatasetFormat::Csv => parse_csv(&bytes)?,
            DatasetFormat::Json => parse_json(&bytes)?,
        };
        tracing::debug!("Loaded {} points from {}", records.len(), self.path);
        Ok(records)
    }
}

impl<S: Storage> PointStore for DatasetPointStore<S> {
    type Session = MemorySession;

    async fn acquire(&self) -> Result<Self::Session> {
        Ok(MemorySession::detached(self.load().await?))
    }
}

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<PointRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ProximityError::storage(format!("invalid dataset header: {}", e)))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ProximityError::storage(format!("invalid dataset row: {}", e)))?;
        let data: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), infer_value(cell)))
            .collect();
        records.push(PointRecord::new(data));
    }

    Ok(records)
}

pub fn parse_json(bytes: &[u8]) -> Result<Vec<PointRecord>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ProximityError::storage(format!("invalid dataset JSON: {}", e)))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(data) => Ok(PointRecord::new(data)),
                other => Err(ProximityError::storage(format!(
                    "dataset entries must be objects, got {}",
                    other
                ))),
            })
            .collect(),
        _ => Err(ProximityError::storage(
            "dataset JSON must be an array of objects",
        )),
    }
}

/// Types a CSV cell: a cell that is already a JSON number in canonical form
/// becomes that number, an empty cell becomes null and everything else stays
/// text exactly as written. `08012`, `4.50` and `1e3` therefore keep their digits.
fn infer_value(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    match serde_json::from_str::<serde_json::Number>(cell) {
        Ok(number) if number.to_string() == cell => Value::Number(number),
        _ => Value::String(cell.to_string()),
    }
}
