pub mod file_store;
pub mod memory_store;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// Re-export commonly used items
pub use file_store::JsonFileCacheStore;
pub use memory_store::MemoryCacheStore;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache entry is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Key/value store backing the snapshot cache.
///
/// Values are opaque JSON documents. Stores give read-after-write per key and
/// nothing more: concurrent writers to one key race and the last one wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` when the key has never been written (or was evicted)
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError>;
}
