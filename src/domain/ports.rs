use crate::domain::model::{BoundingBox, PointRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte-level access to wherever a dataset lives (local disk, S3, ...).
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// A scoped session on a point store. Dropping the session releases it.
#[async_trait]
pub trait StoreSession: Send {
    /// All records with latitude in `[min_lat, max_lat]` and longitude in
    /// `[min_lon, max_lon]`, in no particular order.
    async fn range_query(&mut self, bounds: &BoundingBox) -> Result<Vec<PointRecord>>;
}

/// The storage collaborator behind a proximity search.
pub trait PointStore: Send + Sync {
    type Session: StoreSession;

    fn acquire(&self) -> impl std::future::Future<Output = Result<Self::Session>> + Send;
}

pub trait SearchConfig: Send + Sync {
    fn max_radius_miles(&self) -> Option<f64>;
    fn pretty_output(&self) -> bool;
}
