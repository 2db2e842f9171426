// Adapters layer: concrete point stores and byte storage for external systems.

pub mod dataset;
pub mod http;
pub mod memory;
pub mod sqlite;
pub mod storage;
