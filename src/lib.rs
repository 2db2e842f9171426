pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

#[cfg(feature = "lambda")]
pub use crate::config::lambda::{LambdaConfig, S3Storage};

pub use crate::adapters::dataset::DatasetPointStore;
pub use crate::adapters::http::{BoundParams, HttpPointStore};
pub use crate::adapters::memory::InMemoryPointStore;
pub use crate::adapters::sqlite::SqlitePointStore;
pub use crate::adapters::storage::LocalStorage;
pub use crate::config::StoreKind;
pub use crate::core::search::{render_json, ProximitySearch};
pub use crate::domain::model::{AnnotatedRecord, BoundingBox, GeoPoint, PointRecord, ProximityQuery};
pub use crate::utils::error::{ProximityError, Result};
