//! Cache manager that hands out regions on the configured backend.

use std::sync::Arc;

use dashmap::DashMap;

use crate::cache::memory::MemoryCache;
use crate::cache::noop::NoOpCache;
use crate::cache::{AppCache, CacheRegion};
use crate::config::settings::CacheConfig;

/// Owns the cache configuration and one backend per named region.
///
/// Built once at startup and passed to the services that need it; cloning
/// shares the same regions.
#[derive(Clone)]
pub struct CacheManager {
    config: CacheConfig,
    regions: Arc<DashMap<String, CacheRegion>>,
}

impl CacheManager {
    /// If caching is disabled, every region is backed by `NoOpCache`.
    pub fn new(config: CacheConfig) -> Self {
        tracing::info!(
            enabled = config.enabled,
            max_size = config.memory.max_size,
            ttl_seconds = config.memory.ttl_seconds,
            "Cache manager initialized"
        );
        Self {
            config,
            regions: Arc::new(DashMap::new()),
        }
    }

    /// Get the region called `name`, creating it on first use.
    pub fn region(&self, name: &str) -> CacheRegion {
        self.regions
            .entry(name.to_string())
            .or_insert_with(|| CacheRegion::new(name, self.build_backend()))
            .clone()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn build_backend(&self) -> Arc<dyn AppCache> {
        if self.config.enabled {
            Arc::new(MemoryCache::new(&self.config.memory))
        } else {
            Arc::new(NoOpCache::new())
        }
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("regions", &self.regions.len())
            .finish()
    }
}
