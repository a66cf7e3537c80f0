use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use std::time::Duration;

use super::{CacheError, CacheStore};

/// In-process cache store backed by moka.
///
/// Freshness is decided by the caller from the entry's own timestamp; the
/// optional retention here only bounds memory for keys nobody asks for again.
#[derive(Clone)]
pub struct MemoryCacheStore {
    entries: Cache<String, Value>,
}

impl MemoryCacheStore {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Same as [`MemoryCacheStore::new`] but drops entries `retention` after
    /// they were written
    pub fn with_retention(max_capacity: u64, retention: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(retention)
                .build(),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.entries.get(key).await)
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }
}
