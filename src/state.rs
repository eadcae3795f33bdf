//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::cache::CacheManager;
use crate::config::Settings;
use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::repositories::{EmployeeStore, Repositories};
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap; services, pool and cache manager are all `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Present when running against Postgres; used by readiness checks
    pub db_pool: Option<AsyncDbPool>,
    pub cache: CacheManager,
}

impl AppState {
    /// Builds state backed by the Postgres pool.
    pub fn new(pool: AsyncDbPool, settings: &Settings) -> AppResult<Self> {
        Self::build(Repositories::new(pool.clone()), Some(pool), settings)
    }

    /// Builds state over an arbitrary store, without a database pool.
    pub fn with_store(store: Arc<dyn EmployeeStore>, settings: &Settings) -> AppResult<Self> {
        Self::build(Repositories::with_store(store), None, settings)
    }

    /// Builds state over a fresh in-memory store.
    pub fn in_memory(settings: &Settings) -> AppResult<Self> {
        Self::build(Repositories::in_memory(), None, settings)
    }

    fn build(
        repos: Repositories,
        db_pool: Option<AsyncDbPool>,
        settings: &Settings,
    ) -> AppResult<Self> {
        let cache = CacheManager::new(settings.cache.clone());
        let services = Services::new(repos, &cache, &settings.auth)?;
        Ok(Self {
            services,
            db_pool,
            cache,
        })
    }
}
