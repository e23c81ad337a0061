//! Larder - filesystem-backed key/value cache
//!
//! Stores entries as individual files under a sharded directory tree,
//! with atomic writes, advisory lock files, TTL jitter and probabilistic
//! cache-stampede mitigation.

pub mod adaptor;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;

pub use adaptor::{Adaptor, Entry, FileAdaptor, GcStats};
pub use cache::Cache;
pub use error::{CacheError, CacheResult};
