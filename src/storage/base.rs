use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::StorageConfig;

/// Key under which the session token is persisted.
pub const TOKEN_KEY: &str = "auth_token";

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The KeyValueStorage trait abstracts durable client-side storage
/// (get, set, remove), the way a browser's local storage would behave.
///
/// Access is not coordinated between processes; the last writer wins.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn describe(&self) -> String;
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn KeyValueStorage> {
    let storage: Arc<dyn KeyValueStorage> = match config {
        StorageConfig::Memory => Arc::new(MemoryStorage::new()),
        StorageConfig::File(file_config) => Arc::new(FileStorage::new(&file_config.path)),
    };
    info!("Using {} for session storage.", storage.describe());
    storage
}
