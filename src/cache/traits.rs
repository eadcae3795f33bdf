//! AppCache trait definition.

use async_trait::async_trait;

use crate::cache::CacheError;

/// Byte-level cache backend.
///
/// Every call is individually atomic; nothing is promised across keys.
/// Entries expire a fixed time after they were last written.
#[async_trait]
pub trait AppCache: Send + Sync {
    /// Get a live value; expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a value, restarting its expiry clock.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Remove a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), CacheError>;
}
