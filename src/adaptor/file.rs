//! File-based storage adaptor
//!
//! Entries live as individual files under a sharded directory tree.
//! Writes go to a temp file in the target directory and are renamed
//! into place under an advisory lock file, so readers never observe a
//! half-written entry. `clear` retires the whole root directory in one
//! rename; garbage collection reclaims expired files, emptied shard
//! directories and retired generations.

use crate::adaptor::entry::{decode_expiry, Entry, HEADER_LEN};
use crate::adaptor::{validate_key, Adaptor, GcStats};
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lock acquisition attempts before a write or delete gives up
const LOCK_ATTEMPTS: u32 = 3;

/// Backoff range between lock attempts, milliseconds
const LOCK_BACKOFF_MS: std::ops::RangeInclusive<u64> = 1..=10;

/// Filesystem-backed adaptor with hashed directory sharding
pub struct FileAdaptor {
    root: PathBuf,
    hash_depth: usize,
}

impl FileAdaptor {
    /// Create an adaptor rooted at `root`, creating the directory if needed
    ///
    /// `hash_depth` is the number of single-character shard directories
    /// derived from the key's leading characters.
    pub async fn new(root: impl Into<PathBuf>, hash_depth: u32) -> CacheResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| CacheError::RootCreate {
                path: root.clone(),
                source: e,
            })?;

        let root = fs::canonicalize(&root)
            .await
            .map_err(|e| CacheError::RootCreate {
                path: root.clone(),
                source: e,
            })?;

        Ok(Self {
            root,
            hash_depth: hash_depth as usize,
        })
    }

    /// The canonicalized cache root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its storage path
    ///
    /// The first `hash_depth` characters of the key (padded with `'0'`
    /// for short keys) become single-character shard directories; the
    /// full key is the final segment, so shard collisions only cause
    /// directory fan-in, never data loss.
    pub fn entry_path(&self, key: &str) -> CacheResult<PathBuf> {
        validate_key(key)?;

        let mut path = self.root.clone();
        for c in key
            .chars()
            .chain(std::iter::repeat('0'))
            .take(self.hash_depth)
        {
            path.push(c.to_string());
        }
        path.push(key);
        Ok(path)
    }

    fn lock_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Try to take the exclusive advisory lock for an entry path
    ///
    /// The lock token is the existence of `<path>.lock`, created with
    /// `O_CREAT|O_EXCL`. Bounded retries with randomized backoff;
    /// `None` after the budget is exhausted.
    async fn acquire_lock(&self, path: &Path) -> Option<PathBuf> {
        let lock = Self::lock_path(path);

        for attempt in 1..=LOCK_ATTEMPTS {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock)
                .await
            {
                Ok(_) => return Some(lock),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    let backoff = rand::thread_rng().gen_range(LOCK_BACKOFF_MS);
                    debug!(
                        path = %lock.display(),
                        attempt,
                        backoff_ms = backoff,
                        "lock held, backing off"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    warn!(path = %lock.display(), error = %e, "failed to create lock file");
                    return None;
                }
            }
        }

        warn!(path = %lock.display(), "lock contention, giving up");
        None
    }

    async fn release_lock(lock: &Path) {
        if let Err(e) = fs::remove_file(lock).await {
            warn!(path = %lock.display(), error = %e, "failed to release lock");
        }
    }

    /// Whether a file should be reclaimed by the expiry sweep
    ///
    /// Entry files are judged by their header expiry; files without a
    /// parseable header (orphaned temp files, stale locks) fall back to
    /// their mtime.
    async fn is_stale(path: &Path, now: DateTime<Utc>) -> bool {
        let mut header = [0u8; HEADER_LEN];
        let expiry = match fs::File::open(path).await {
            Ok(mut f) => match f.read_exact(&mut header).await {
                Ok(_) => decode_expiry(&header),
                Err(_) => None,
            },
            Err(_) => return false,
        };

        match expiry {
            Some(expires_at) => expires_at <= now,
            None => match fs::metadata(path).await.and_then(|m| m.modified()) {
                Ok(mtime) => DateTime::<Utc>::from(mtime) <= now,
                Err(_) => false,
            },
        }
    }
}

#[async_trait]
impl Adaptor for FileAdaptor {
    async fn get(&self, key: &str) -> Option<Entry> {
        let path = self.entry_path(key).ok()?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "entry unreadable");
                return None;
            }
        };

        match Entry::decode(&bytes) {
            Some(entry) => Some(entry),
            None => {
                warn!(path = %path.display(), "corrupt entry header, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> bool {
        let path = match self.entry_path(key) {
            Ok(path) => path,
            Err(e) => {
                debug!(key, error = %e, "rejecting set");
                return false;
            }
        };

        let Some(expires_at) = Utc::now().checked_add_signed(ttl) else {
            warn!(key, "ttl overflows representable time");
            return false;
        };

        // Temp file in the target's own directory: same filesystem,
        // so the rename below is atomic.
        let dir = path.parent().unwrap_or(&self.root);
        if let Err(e) = fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "failed to create shard directory");
            return false;
        }
        let temp = dir.join(format!(".{}.tmp", Uuid::new_v4()));

        if let Err(e) = fs::write(&temp, Entry::encode(payload, expires_at)).await {
            warn!(path = %temp.display(), error = %e, "failed to write temp entry");
            return false;
        }

        // Orphaned temp files from failed locks age out via garbage
        // collection.
        let Some(lock) = self.acquire_lock(&path).await else {
            return false;
        };

        let renamed = fs::rename(&temp, &path).await;
        Self::release_lock(&lock).await;

        match renamed {
            Ok(()) => {
                debug!(key, expires_at = %expires_at, "entry stored");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "rename into place failed");
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        let path = match self.entry_path(key) {
            Ok(path) => path,
            Err(e) => {
                debug!(key, error = %e, "rejecting delete");
                return false;
            }
        };

        // A missing entry is a failure, not an error.
        if fs::metadata(&path).await.is_err() {
            return false;
        }

        let Some(lock) = self.acquire_lock(&path).await else {
            return false;
        };

        let removed = fs::remove_file(&path).await;
        Self::release_lock(&lock).await;

        match removed {
            Ok(()) => {
                debug!(key, "entry deleted");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "unlink failed");
                false
            }
        }
    }

    async fn clear(&self) -> bool {
        if fs::metadata(&self.root).await.is_err() {
            return false;
        }

        let Some((parent, name)) = self.root.parent().zip(self.root.file_name()) else {
            return false;
        };

        let now = Utc::now();
        let digest = Sha256::digest(format!(
            "{}{}",
            self.root.display(),
            now.timestamp_nanos_opt().unwrap_or_default()
        ));
        let retired = parent.join(format!(
            "{}_{}_{}",
            name.to_string_lossy(),
            now.timestamp(),
            &hex::encode(digest)[..6]
        ));

        // Swap the live root out in one rename; in-flight operations
        // against the old path land in the retiring generation, which
        // garbage collection later reclaims.
        if let Err(e) = fs::rename(&self.root, &retired).await {
            warn!(root = %self.root.display(), error = %e, "failed to retire cache root");
            return false;
        }

        match fs::create_dir_all(&self.root).await {
            Ok(()) => {
                info!(root = %self.root.display(), retired = %retired.display(), "cache cleared");
                true
            }
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "failed to recreate cache root");
                false
            }
        }
    }

    async fn garbage_collect(&self) -> GcStats {
        let mut stats = GcStats::default();
        let now = Utc::now();

        // Sweep 1: expired files under the live root, then the shard
        // directories they leave empty, deepest first. Lock-free; a
        // concurrent set always writes an expiry at or after "now", so
        // only unambiguously dead files are touched.
        let mut pending = vec![self.root.clone()];
        let mut dirs: Vec<PathBuf> = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                match entry.file_type().await {
                    Ok(ft) if ft.is_dir() => {
                        dirs.push(path.clone());
                        pending.push(path);
                    }
                    Ok(_) => {
                        if Self::is_stale(&path, now).await
                            && fs::remove_file(&path).await.is_ok()
                        {
                            stats.expired_files += 1;
                        }
                    }
                    Err(_) => {}
                }
            }
        }

        dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in dirs {
            // Fails while non-empty, which is exactly the filter we want.
            if fs::remove_dir(&dir).await.is_ok() {
                stats.pruned_dirs += 1;
            }
        }

        // Sweep 2: retired generations from previous clears are always
        // removed whole, no staleness filter.
        if let Some((parent, name)) = self.root.parent().zip(self.root.file_name()) {
            let prefix = format!("{}_", name.to_string_lossy());
            if let Ok(mut entries) = fs::read_dir(parent).await {
                while let Ok(Some(entry)) = entries.next_entry().await {
                    let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                    if is_dir
                        && entry.file_name().to_string_lossy().starts_with(&prefix)
                        && fs::remove_dir_all(entry.path()).await.is_ok()
                    {
                        stats.retired_generations += 1;
                    }
                }
            }
        }

        info!(
            expired_files = stats.expired_files,
            pruned_dirs = stats.pruned_dirs,
            retired_generations = stats.retired_generations,
            "garbage collection complete"
        );
        stats
    }
}
