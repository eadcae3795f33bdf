//! Memory cache implementation using cached::TimedSizedCache.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};

use crate::cache::{AppCache, CacheError};
use crate::config::settings::MemoryCacheConfig;

/// In-memory cache with a size bound and expiry after write.
///
/// Reads do not extend an entry's lifetime.
pub struct MemoryCache {
    store: Mutex<TimedSizedCache<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        Self::with_lifespan(config.max_size, Duration::from_secs(config.ttl_seconds))
    }

    pub fn with_lifespan(max_size: usize, lifespan: Duration) -> Self {
        Self {
            store: Mutex::new(TimedSizedCache::with_size_and_lifespan(max_size, lifespan)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, TimedSizedCache<String, Vec<u8>>>, CacheError> {
        self.store
            .lock()
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

#[async_trait]
impl AppCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.lock()?.cache_get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.lock()?.cache_set(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.cache_remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.lock()?.cache_clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> MemoryCache {
        MemoryCache::with_lifespan(16, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = cache();
        cache.set("1", b"one".to_vec()).await.unwrap();
        assert_eq!(cache.get("1").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(cache.get("2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = cache();
        cache.set("1", b"one".to_vec()).await.unwrap();
        cache.set("2", b"two".to_vec()).await.unwrap();

        cache.remove("1").await.unwrap();
        cache.remove("missing").await.unwrap();
        assert_eq!(cache.get("1").await.unwrap(), None);
        assert!(cache.get("2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache();
        cache.set("1", b"one".to_vec()).await.unwrap();
        cache.set("all", b"[]".to_vec()).await.unwrap();

        cache.clear().await.unwrap();
        assert_eq!(cache.get("1").await.unwrap(), None);
        assert_eq!(cache.get("all").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_write() {
        let cache = MemoryCache::with_lifespan(16, Duration::from_millis(100));
        cache.set("1", b"one".to_vec()).await.unwrap();
        assert!(cache.get("1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.get("1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rewrite_resets_age() {
        let cache = MemoryCache::with_lifespan(16, Duration::from_millis(300));
        cache.set("1", b"old".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        cache.set("1", b"new".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get("1").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_reads_do_not_extend_lifetime() {
        let cache = MemoryCache::with_lifespan(16, Duration::from_millis(300));
        cache.set("1", b"one".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.get("1").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get("1").await.unwrap(), None);
    }
}
