use crate::core::Storage;
use crate::utils::error::{ProximityError, Result};
use std::path::Path;

/// Reads datasets from the local file system, relative to `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        tokio::fs::read(&full_path).await.map_err(|e| {
            ProximityError::storage(format!("cannot read {}: {}", full_path.display(), e))
        })
    }
}
