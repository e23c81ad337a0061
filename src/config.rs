//! Configuration for larder
//!
//! Loaded from `~/.config/larder/config.toml` when present, otherwise
//! built from defaults. Unrecognized options are rejected.

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Storage adaptor settings
    pub storage: StorageConfig,

    /// Cache policy settings
    pub policy: PolicyConfig,
}

/// Storage adaptor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Cache root directory
    pub root: PathBuf,

    /// Number of single-character shard directory levels
    pub hash_depth: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            hash_depth: 2,
        }
    }
}

/// Cache policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// TTL applied when a write does not name one, in seconds
    pub default_ttl_secs: i64,

    /// Symmetric TTL fluctuation, 0-100 percent
    pub jitter_percent: u8,

    /// How long past expiry the stampede check applies, in seconds
    pub stampede_window_secs: i64,

    /// Per-read chance an entry inside the window reads as expired, 0-100
    pub stampede_chance: u8,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 86_400,
            jitter_percent: 5,
            stampede_window_secs: 60,
            stampede_chance: 5,
        }
    }
}

impl PolicyConfig {
    /// Check value ranges
    pub fn validate(&self) -> CacheResult<()> {
        if self.default_ttl_secs < 0 {
            return Err(CacheError::ConfigInvalid {
                reason: format!("default_ttl_secs must be non-negative, got {}", self.default_ttl_secs),
            });
        }
        if self.stampede_window_secs < 0 {
            return Err(CacheError::ConfigInvalid {
                reason: format!(
                    "stampede_window_secs must be non-negative, got {}",
                    self.stampede_window_secs
                ),
            });
        }
        if self.jitter_percent > 100 {
            return Err(CacheError::ConfigInvalid {
                reason: format!("jitter_percent must be 0-100, got {}", self.jitter_percent),
            });
        }
        if self.stampede_chance > 100 {
            return Err(CacheError::ConfigInvalid {
                reason: format!("stampede_chance must be 0-100, got {}", self.stampede_chance),
            });
        }
        Ok(())
    }
}

/// Default cache root directory
pub fn default_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("larder")
}

impl Config {
    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub async fn load(path: Option<&Path>) -> CacheResult<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(&path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(path: &Path) -> CacheResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| CacheError::io(format!("reading config from {}", path.display()), e))?;

        let config: Self = toml::from_str(&content)?;
        config.policy.validate()?;
        Ok(config)
    }
}
