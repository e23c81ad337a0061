//! Cache policy layer
//!
//! Wraps a storage adaptor with the typed-value boundary (JSON), TTL
//! jitter, and the probabilistic stampede check. Below this layer
//! everything is raw bytes; above it, serde values.

use crate::adaptor::{validate_key, Adaptor, GcStats};
use crate::config::PolicyConfig;
use crate::error::CacheResult;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// TTL-aware cache over a storage adaptor
///
/// Immutable after construction apart from the bypass switch. Safe to
/// share across tasks; all mutual exclusion lives in the adaptor.
pub struct Cache {
    adaptor: Box<dyn Adaptor>,
    default_ttl: Duration,
    jitter_percent: i64,
    stampede_window: Duration,
    stampede_chance: i64,
    bypass: AtomicBool,
}

impl Cache {
    /// Build a cache from an adaptor and a validated policy
    pub fn new(adaptor: Box<dyn Adaptor>, policy: &PolicyConfig) -> CacheResult<Self> {
        policy.validate()?;
        Ok(Self {
            adaptor,
            default_ttl: Duration::seconds(policy.default_ttl_secs),
            jitter_percent: i64::from(policy.jitter_percent),
            stampede_window: Duration::seconds(policy.stampede_window_secs),
            stampede_chance: i64::from(policy.stampede_chance),
            bypass: AtomicBool::new(false),
        })
    }

    /// Force every read to miss; writes still go through
    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
    }

    /// Fetch a value, falling back to `default` on miss or expiry
    ///
    /// Never errors for "not found" or "expired"; only an invalid key
    /// is a typed error. A stale entry is left on disk for garbage
    /// collection to reclaim.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> CacheResult<T> {
        if self.bypass.load(Ordering::Relaxed) {
            return Ok(default);
        }
        validate_key(key)?;

        let Some(entry) = self.adaptor.get(key).await else {
            return Ok(default);
        };

        if !self.is_fresh(entry.expires_at, Utc::now()) {
            debug!(key, expires_at = %entry.expires_at, "entry expired");
            return Ok(default);
        }

        match serde_json::from_slice(&entry.payload) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "stored payload failed to decode, treating as miss");
                Ok(default)
            }
        }
    }

    /// Store a value under `key`
    ///
    /// `ttl` defaults to the configured TTL; either way a uniformly
    /// random jitter of up to ±`jitter_percent` is applied so entries
    /// written together do not all expire together.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        validate_key(key)?;

        let payload = match serde_json::to_vec(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "value failed to encode");
                return Ok(false);
            }
        };

        Ok(self
            .adaptor
            .set(key, &payload, self.effective_ttl(ttl))
            .await)
    }

    /// Remove an entry; `Ok(false)` if it does not exist
    pub async fn delete(&self, key: &str) -> CacheResult<bool> {
        validate_key(key)?;
        Ok(self.adaptor.delete(key).await)
    }

    /// Whether a fresh entry exists for `key`, without decoding it
    pub async fn has(&self, key: &str) -> CacheResult<bool> {
        if self.bypass.load(Ordering::Relaxed) {
            return Ok(false);
        }
        validate_key(key)?;

        Ok(match self.adaptor.get(key).await {
            Some(entry) => self.is_fresh(entry.expires_at, Utc::now()),
            None => false,
        })
    }

    /// Discard every entry at once
    pub async fn clear(&self) -> bool {
        self.adaptor.clear().await
    }

    /// Reclaim expired entries and retired generations
    pub async fn garbage_collect(&self) -> GcStats {
        self.adaptor.garbage_collect().await
    }

    /// Fetch several keys; each key gets the (cloned) default on miss
    ///
    /// Independent per-key application, no ordering or atomicity
    /// across keys.
    pub async fn get_multiple<T>(&self, keys: &[String], default: T) -> CacheResult<HashMap<String, T>>
    where
        T: DeserializeOwned + Clone,
    {
        let mut result = HashMap::with_capacity(keys.len());
        for key in keys {
            result.insert(key.clone(), self.get(key, default.clone()).await?);
        }
        Ok(result)
    }

    /// Store several values; `Ok(true)` only if every write succeeded
    pub async fn set_multiple<T: Serialize>(
        &self,
        values: &[(String, T)],
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        let mut all_ok = true;
        for (key, value) in values {
            all_ok &= self.set(key, value, ttl).await?;
        }
        Ok(all_ok)
    }

    /// Remove several entries; `Ok(true)` only if every delete succeeded
    pub async fn delete_multiple(&self, keys: &[String]) -> CacheResult<bool> {
        let mut all_ok = true;
        for key in keys {
            all_ok &= self.delete(key).await?;
        }
        Ok(all_ok)
    }

    /// Nominal TTL adjusted by ±`jitter_percent`, rounded to whole ms
    fn effective_ttl(&self, ttl: Option<Duration>) -> Duration {
        let base = ttl.unwrap_or(self.default_ttl);
        let jitter = rand::thread_rng().gen_range(-self.jitter_percent..=self.jitter_percent);
        let millis = (base.num_milliseconds() as f64 * (100 + jitter) as f64 / 100.0).round();
        Duration::milliseconds(millis as i64)
    }

    /// Stampede-aware freshness check
    ///
    /// Entries just past expiry are probabilistically served as live so
    /// only a fraction of concurrent readers trigger recomputation of a
    /// hot key, the rest serving stale-but-acceptable data.
    fn is_fresh(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if expires_at > now {
            return true;
        }
        if expires_at > now - self.stampede_window {
            return rand::thread_rng().gen_range(0..100) > self.stampede_chance;
        }
        false
    }
}
