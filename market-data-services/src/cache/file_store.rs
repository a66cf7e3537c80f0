use async_trait::async_trait;
use market_core::percent_encode;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CacheError, CacheStore};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache store keeping one JSON document per key in a directory.
///
/// Survives restarts, and several processes can share one directory.
/// Writes go to a temporary file that is renamed over the target, so a
/// reader never sees a half-written document.
///
/// Key format on disk: `{escaped key}.json`, where every byte outside
/// `[A-Za-z0-9_.~-]` is written as `%XX`.
pub struct JsonFileCacheStore {
    dir: PathBuf,
}

impl JsonFileCacheStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", percent_encode(key)))
    }
}

#[async_trait]
impl CacheStore for JsonFileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(key);
        let tmp = target.with_extension(format!(
            "json.tmp-{}-{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let bytes = serde_json::to_vec(&value)?;
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        Ok(())
    }
}
