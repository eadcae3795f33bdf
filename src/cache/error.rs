//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// These never reach API callers: `CacheRegion` logs them and degrades to a
/// miss or a no-op.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
