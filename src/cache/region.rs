//! Typed, failure-tolerant view over one cache namespace.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{AppCache, CacheError};

/// A named cache namespace holding JSON-encoded values.
///
/// Backend and codec failures are logged and then treated as a miss (reads)
/// or as done (writes), so callers never see them.
#[derive(Clone)]
pub struct CacheRegion {
    name: Arc<str>,
    backend: Arc<dyn AppCache>,
}

impl CacheRegion {
    pub fn new(name: &str, backend: Arc<dyn AppCache>) -> Self {
        Self {
            name: Arc::from(name),
            backend,
        }
    }

    /// Look up `key`, returning `None` on a miss or any cache failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key).await {
            Ok(Some(value)) => {
                tracing::debug!(region = %self.name, key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                tracing::debug!(region = %self.name, key, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(region = %self.name, key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store `value` under `key`, restarting its expiry.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = match serde_json::to_vec(value) {
            Ok(bytes) => self.backend.set(key, bytes).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = result {
            tracing::warn!(region = %self.name, key, error = %e, "cache write failed");
        }
    }

    pub async fn evict(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            tracing::warn!(region = %self.name, key, error = %e, "cache eviction failed");
        }
    }

    /// Drop every entry in this region.
    pub async fn clear(&self) {
        match self.backend.clear().await {
            Ok(()) => tracing::debug!(region = %self.name, "cache region cleared"),
            Err(e) => tracing::warn!(region = %self.name, error = %e, "cache clear failed"),
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for CacheRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegion")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
