use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable string key-value storage, the client-side equivalent of a
/// browser's local storage. No locking across processes; last writer wins.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn KeyValueStorage> {
    match config {
        StorageConfig::Memory => {
            info!("Using in-memory session storage.");
            Arc::new(MemoryStorage::new())
        }
        StorageConfig::File(file_config) => {
            info!("Using file session storage at {}", file_config.path.display());
            Arc::new(FileStorage::new(file_config.path.clone()))
        }
    }
}
