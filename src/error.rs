//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! Expected conditions are absence-signaling: lookups return `Option` or a
//! found flag. These error values exist for the boundary methods that want
//! to tell the two failure conditions apart.

use thiserror::Error;

// == Cache Error Enum ==
/// Error type for fallible cache lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not physically present in the cache
    #[error("key not found: {0}")]
    NotFound(String),

    /// Key present but past its expiration instant
    #[error("key expired: {0}")]
    Expired(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
