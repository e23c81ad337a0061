//! Error types for larder
//!
//! All modules use `CacheResult<T>` as their return type. Storage and
//! lock failures are absorbed into boolean outcomes at the adaptor
//! boundary; only caller-input errors (bad keys, bad configuration)
//! propagate as typed errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for larder operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in larder
#[derive(Error, Debug)]
pub enum CacheError {
    // Caller-input errors (fail fast)
    #[error("Invalid cache key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigInvalid { reason: String },

    #[error("Failed to create cache root {path}: {source}")]
    RootCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Internal plumbing - absorbed into boolean outcomes at the
    // adaptor boundary, never returned from library operations
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock contention on {path}")]
    LockContention { path: PathBuf },

    #[error("Corrupt cache entry: {path}")]
    CorruptEntry { path: PathBuf },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // CLI-surface errors
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid-key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockContention { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::LockContention { .. } => Some("Another writer holds the lock; retry shortly"),
            Self::InvalidKey { .. } => {
                Some("Keys must be non-empty path segments without separators")
            }
            _ => None,
        }
    }
}
