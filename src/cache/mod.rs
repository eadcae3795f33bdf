//! Read cache for the service layer.
//!
//! `CacheManager` is built from `[cache]` configuration and hands out named
//! `CacheRegion`s. Each region sits on its own `AppCache` backend: the
//! in-process `MemoryCache` (expiry after write) or `NoOpCache` when caching
//! is disabled. `KeyLocks` serializes fills and invalidations of one key.
//!
//! ```toml
//! [cache]
//! enabled = true
//!
//! [cache.memory]
//! max_size = 10000
//! ttl_seconds = 60
//! ```

mod error;
mod key_lock;
mod manager;
mod memory;
mod noop;
mod region;
mod traits;

pub use error::CacheError;
pub use key_lock::{KeyGuard, KeyLocks};
pub use manager::CacheManager;
pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use region::CacheRegion;
pub use traits::AppCache;

#[cfg(test)]
pub(crate) use region::tests::BrokenCache;
