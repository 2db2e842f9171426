pub mod assembler;
pub mod bounding_box;
pub mod distance;
pub mod range_query;
pub mod search;

pub use crate::domain::model::{AnnotatedRecord, BoundingBox, GeoPoint, PointRecord, ProximityQuery};
pub use crate::domain::ports::{PointStore, SearchConfig, Storage, StoreSession};
pub use crate::utils::error::Result;
