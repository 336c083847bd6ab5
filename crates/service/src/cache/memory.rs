use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{CacheClient, CacheError};
use crate::health::Probe;

/// In-process cache with per-entry expiry.
///
/// Can be switched into an outage state with [`set_unavailable`](Self::set_unavailable),
/// after which every call fails like an unreachable Redis would.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (Vec<u8>, Instant)>,
    unavailable: AtomicBool,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Overwrite an entry directly, bypassing the TTL argument (one hour).
    pub fn put_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.to_string(), (value.into(), Instant::now() + Duration::from_secs(3600)));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).map(|e| e.1 > Instant::now()).unwrap_or(false)
    }

    /// Remaining lifetime of a live entry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.get(key).and_then(|e| e.1.checked_duration_since(Instant::now()))
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    fn check_up(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        let now = Instant::now();
        let hit = match self.entries.get(key) {
            Some(entry) if entry.1 > now => Some(entry.0.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if hit.is_none() {
            self.entries.remove(key);
        }
        Ok(hit)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        self.entries.insert(key.to_string(), (value.to_vec(), Instant::now() + ttl));
        Ok(())
    }
}

#[async_trait]
impl Probe for MemoryCache {
    async fn ping(&self) -> Result<(), String> {
        self.check_up().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire() {
        let cache = MemoryCache::new();
        cache.set_ex("k", b"v", Duration::from_secs(5)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.contains_key("k"));
    }

    #[tokio::test]
    async fn outage_fails_every_call() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        assert!(matches!(cache.get("k").await, Err(CacheError::Unavailable(_))));
        assert!(cache.set_ex("k", b"v", Duration::from_secs(1)).await.is_err());
        assert!(cache.ping().await.is_err());

        cache.set_unavailable(false);
        assert!(cache.ping().await.is_ok());
    }
}
