//! Storage adaptors
//!
//! An adaptor maps string keys to stored byte payloads carrying an
//! absolute expiry instant. Adaptors do not interpret expiry; the
//! policy layer in [`crate::cache`] does.

pub mod entry;
pub mod file;

pub use entry::Entry;
pub use file::FileAdaptor;

use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use chrono::Duration;
use serde::Serialize;

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 255;

/// Abstract byte-oriented key/value store with per-entry expiry
///
/// `set` and `delete` require mutual exclusion against concurrent
/// writers and report failures (lock contention, IO) as `false`.
/// `get` is lock-free: a reader racing an in-flight write observes
/// either the fully-old or fully-new entry, never a partial one.
#[async_trait]
pub trait Adaptor: Send + Sync {
    /// Read the full payload and expiry for a key, `None` if absent
    async fn get(&self, key: &str) -> Option<Entry>;

    /// Store a payload with expiry `now + ttl`, replacing any prior entry
    ///
    /// A negative `ttl` stores an entry that is already expired.
    async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> bool;

    /// Remove an entry; `false` if it does not exist or the lock is contended
    async fn delete(&self, key: &str) -> bool;

    /// Discard every entry at once
    async fn clear(&self) -> bool;

    /// Reclaim expired entries, empty shard directories and retired
    /// cache generations
    async fn garbage_collect(&self) -> GcStats;
}

/// Counters reported by a garbage collection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GcStats {
    /// Files removed because their expiry had passed
    pub expired_files: u64,

    /// Shard directories removed after being left empty
    pub pruned_dirs: u64,

    /// Whole `<root>_*` generations removed
    pub retired_generations: u64,
}

/// Validate that a key can serve as a single path segment
///
/// Rejected: empty keys, keys over [`MAX_KEY_LEN`] bytes, path
/// separators, NUL bytes, and the `.`/`..` directory names.
pub fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::invalid_key(key, "key is empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(CacheError::invalid_key(
            key,
            format!("key exceeds {} bytes", MAX_KEY_LEN),
        ));
    }
    if key == "." || key == ".." {
        return Err(CacheError::invalid_key(key, "key is a directory name"));
    }
    if key.contains(['/', '\\', '\0']) {
        return Err(CacheError::invalid_key(
            key,
            "key contains a path separator or NUL",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys_pass() {
        for key in ["bingo", "x", "user:42", "a b c", "ümlaut", "0"] {
            assert!(validate_key(key).is_ok(), "{key} should be valid");
        }
    }

    #[test]
    fn invalid_keys_rejected() {
        for key in ["", "a/b", "a\\b", "a\0b", ".", ".."] {
            assert!(
                matches!(validate_key(key), Err(CacheError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn oversized_key_rejected() {
        let key = "k".repeat(MAX_KEY_LEN + 1);
        assert!(validate_key(&key).is_err());
        let key = "k".repeat(MAX_KEY_LEN);
        assert!(validate_key(&key).is_ok());
    }
}
