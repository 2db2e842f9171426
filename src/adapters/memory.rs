use crate::core::{BoundingBox, PointRecord, PointStore, StoreSession};
use crate::utils::error::{ProximityError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Point store over records held in memory. Also tracks how many sessions are
/// open so callers can check that every session was released.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPointStore {
    records: Arc<Vec<PointRecord>>,
    open: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
}

impl InMemoryPointStore {
    pub fn new(records: Vec<PointRecord>) -> Self {
        Self {
            records: Arc::new(records),
            ..Self::default()
        }
    }

    pub fn from_values(values: Vec<serde_json::Value>) -> Result<Self> {
        let records = values
            .into_iter()
            .map(|value| match value {
                serde_json::Value::Object(data) => Ok(PointRecord::new(data)),
                other => Err(ProximityError::storage(format!(
                    "expected a JSON object per point, got {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn acquired_sessions(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl PointStore for InMemoryPointStore {
    type Session = MemorySession;

    async fn acquire(&self) -> Result<Self::Session> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession::tracked(
            Arc::clone(&self.records),
            Arc::clone(&self.open),
        ))
    }
}

/// Session over a shared snapshot of records.
#[derive(Debug)]
pub struct MemorySession {
    records: Arc<Vec<PointRecord>>,
    open: Arc<AtomicUsize>,
}

impl MemorySession {
    fn tracked(records: Arc<Vec<PointRecord>>, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { records, open }
    }

    /// A session that owns its records outright, used by stores that load a fresh
    /// snapshot per session.
    pub fn detached(records: Vec<PointRecord>) -> Self {
        Self::tracked(Arc::new(records), Arc::new(AtomicUsize::new(0)))
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn range_query(&mut self, bounds: &BoundingBox) -> Result<Vec<PointRecord>> {
        Ok(scan(&self.records, bounds))
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!("Released in-memory store session");
    }
}

/// Records whose stored coordinates fall inside `bounds`. Records without usable
/// coordinates can never satisfy the range predicate and are skipped.
pub fn scan(records: &[PointRecord], bounds: &BoundingBox) -> Vec<PointRecord> {
    records
        .iter()
        .filter(|record| match record.point() {
            Ok(point) => bounds.contains(point),
            Err(e) => {
                tracing::trace!("Skipping record outside any range: {}", e);
                false
            }
        })
        .cloned()
        .collect()
}
