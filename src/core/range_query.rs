use crate::core::{BoundingBox, PointRecord, PointStore, StoreSession};
use crate::utils::error::Result;

/// Runs the bounding-box scan against a point store.
///
/// Each call acquires its own session, issues exactly one range query and lets the
/// session drop on every exit path. Candidates are passed through untouched,
/// including the ones the rectangular box over-includes.
pub struct RangeQueryExecutor<'a, S: PointStore> {
    store: &'a S,
}

impl<'a, S: PointStore> RangeQueryExecutor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn fetch_candidates(&self, bounds: &BoundingBox) -> Result<Vec<PointRecord>> {
        let mut session = self.store.acquire().await?;
        let candidates = session.range_query(bounds).await?;

        tracing::debug!(
            "Range query [{:.4}, {:.4}] x [{:.4}, {:.4}] returned {} candidates",
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon,
            candidates.len()
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPointStore;
    use crate::utils::error::ProximityError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn parks() -> InMemoryPointStore {
        InMemoryPointStore::from_values(vec![
            json!({"id": 1, "latitude": 40.0, "longitude": -75.0}),
            json!({"id": 2, "latitude": 40.5, "longitude": -75.5}),
            json!({"id": 3, "latitude": 45.0, "longitude": -80.0}),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_candidates_uses_inclusive_bounds() {
        let store = parks();
        let executor = RangeQueryExecutor::new(&store);

        let bounds = BoundingBox {
            min_lat: 40.0,
            max_lat: 40.5,
            min_lon: -75.5,
            max_lon: -75.0,
        };
        let candidates = executor.fetch_candidates(&bounds).await.unwrap();

        let ids: Vec<i64> = candidates
            .iter()
            .map(|r| r.get("id").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.open_sessions(), 0);
    }

    struct FailingSession {
        open: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StoreSession for FailingSession {
        async fn range_query(&mut self, _bounds: &BoundingBox) -> Result<Vec<PointRecord>> {
            Err(ProximityError::storage("connection reset"))
        }
    }

    impl Drop for FailingSession {
        fn drop(&mut self) {
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct UnreachableStore;

    impl PointStore for UnreachableStore {
        type Session = FailingSession;

        async fn acquire(&self) -> Result<Self::Session> {
            Err(ProximityError::storage("connection refused"))
        }
    }

    #[derive(Default)]
    struct FaultyStore {
        open: Arc<AtomicUsize>,
        acquired: AtomicUsize,
    }

    impl PointStore for FaultyStore {
        type Session = FailingSession;

        async fn acquire(&self) -> Result<Self::Session> {
            self.open.fetch_add(1, Ordering::SeqCst);
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(FailingSession {
                open: Arc::clone(&self.open),
            })
        }
    }

    fn unit_box() -> BoundingBox {
        BoundingBox {
            min_lat: 0.0,
            max_lat: 1.0,
            min_lon: 0.0,
            max_lon: 1.0,
        }
    }

    #[tokio::test]
    async fn test_acquire_failure_propagates_unchanged() {
        let err = RangeQueryExecutor::new(&UnreachableStore)
            .fetch_candidates(&unit_box())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Storage error: connection refused");
    }

    #[tokio::test]
    async fn test_query_failure_propagates_unchanged() {
        let store = FaultyStore::default();
        let err = RangeQueryExecutor::new(&store)
            .fetch_candidates(&unit_box())
            .await
            .unwrap_err();
        assert!(matches!(err, ProximityError::StorageError { ref message } if message == "connection reset"));
    }

    #[tokio::test]
    async fn test_failed_query_releases_session() {
        let store = FaultyStore::default();
        let executor = RangeQueryExecutor::new(&store);

        for _ in 0..3 {
            let result = executor.fetch_candidates(&unit_box()).await;
            assert!(matches!(result, Err(ProximityError::StorageError { .. })));
            assert_eq!(store.open.load(Ordering::SeqCst), 0);
        }
        assert_eq!(store.acquired.load(Ordering::SeqCst), 3);
    }
}
