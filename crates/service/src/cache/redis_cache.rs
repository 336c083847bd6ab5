use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use super::{CacheClient, CacheError};
use crate::health::Probe;

/// Redis handle built on a multiplexed, auto-reconnecting `ConnectionManager`.
///
/// Cloning is cheap; every command runs on a clone so the handle can be shared
/// freely across requests.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect and verify with a `PING`, giving up after `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Unavailable(e.to_string()))?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Unavailable(format!("connect timed out after {timeout:?}")))?
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        let cache = Self { conn };
        tokio::time::timeout(timeout, cache.ping())
            .await
            .map_err(|_| CacheError::Unavailable("ping timed out".into()))?
            .map_err(CacheError::Unavailable)?;
        info!("redis client initialized");
        Ok(cache)
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
            CacheError::Unavailable(e.to_string())
        } else {
            CacheError::Command(e.to_string())
        }
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value.to_vec(), ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

#[async_trait]
impl Probe for RedisCache {
    async fn ping(&self) -> Result<(), String> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| e.to_string())?;
        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(format!("unexpected PING reply: {pong}"))
        }
    }
}
