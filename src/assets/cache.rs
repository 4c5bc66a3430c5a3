use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;

use crate::foundation::error::{WorldviewError, WorldviewResult};

/// Entries kept before the least recently used image is evicted.
pub const DEFAULT_IMAGE_CACHE_CAPACITY: u64 = 256;

/// Retrieves image bytes for a remote reference.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> WorldviewResult<Vec<u8>>;
}

/// Reads `file://` URLs and plain paths, resolving relative ones against `root`.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> WorldviewResult<PathBuf> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(WorldviewError::asset(format!(
                "remote url not supported by the filesystem fetcher: {url}"
            )));
        }
        let raw = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(raw);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        })
    }
}

#[async_trait]
impl ImageFetcher for FsFetcher {
    async fn fetch(&self, url: &str) -> WorldviewResult<Vec<u8>> {
        let path = self.resolve(url)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| WorldviewError::asset(format!("read {}: {e}", path.display())))
    }
}

/// Bounded, shared image byte cache.
///
/// Lookups for a key that is already being fetched wait for that fetch instead of starting
/// another one.
#[derive(Clone, Debug)]
pub struct ImageCache {
    inner: Cache<String, Arc<Vec<u8>>>,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_CACHE_CAPACITY)
    }
}

impl ImageCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: impl Into<String>, bytes: Vec<u8>) {
        self.inner.insert(key.into(), Arc::new(bytes)).await;
    }

    /// Cached bytes for `key`, fetching `url` on a miss.
    pub async fn get_or_fetch(
        &self,
        key: &str,
        url: &str,
        fetcher: &dyn ImageFetcher,
    ) -> WorldviewResult<Arc<Vec<u8>>> {
        self.inner
            .try_get_with(key.to_string(), async {
                tracing::debug!(key, url, "fetching image");
                fetcher.fetch(url).await.map(Arc::new)
            })
            .await
            .map_err(|e| WorldviewError::asset(format!("fetch image \"{key}\": {e}")))
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending evictions so `entry_count` is current.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
