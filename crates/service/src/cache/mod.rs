//! Key-value cache handles.
//!
//! The cache is never authoritative: callers treat every failure as a miss and
//! go to the store. Two handles are provided, [`RedisCache`] for deployments and
//! [`MemoryCache`] as an in-process substitute.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis_cache;

pub use self::memory::MemoryCache;
pub use self::redis_cache::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache command failed: {0}")]
    Command(String),
}

#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    /// Store `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
}
