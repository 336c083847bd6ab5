//! Test doubles shared by unit tests in this crate.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::health::Probe;
use crate::player::{money, Player, PlayerId, PlayerStore, RepositoryError};

/// In-memory `PlayerStore` that counts calls and can be told to fail or stall.
#[derive(Default)]
pub struct CountingStore {
    rows: Mutex<Vec<Player>>,
    fail: Mutex<Option<RepositoryError>>,
    delay: Mutex<Duration>,
    inserts: AtomicUsize,
    by_username: AtomicUsize,
    by_id: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self { Self::default() }

    pub fn fail_with(&self, err: RepositoryError) {
        *self.fail.lock().unwrap() = Some(err);
    }

    pub fn set_delay(&self, d: Duration) {
        *self.delay.lock().unwrap() = d;
    }

    pub fn insert_calls(&self) -> usize { self.inserts.load(Ordering::SeqCst) }
    pub fn find_by_username_calls(&self) -> usize { self.by_username.load(Ordering::SeqCst) }
    pub fn find_by_id_calls(&self) -> usize { self.by_id.load(Ordering::SeqCst) }

    async fn before_call(&self) -> Result<(), RepositoryError> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.fail.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlayerStore for CountingStore {
    async fn insert(&self, player: &Player) -> Result<Player, RepositoryError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.before_call().await?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.username == player.username) {
            return Err(RepositoryError::Conflict);
        }
        let now = Utc::now();
        let mut stored = player.clone();
        stored.id = rows.len() as PlayerId + 1;
        stored.balance = money(stored.balance);
        stored.created_at = now;
        stored.updated_at = now;
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Player>, RepositoryError> {
        self.by_username.fetch_add(1, Ordering::SeqCst);
        self.before_call().await?;
        Ok(self.rows.lock().unwrap().iter().find(|p| p.username == username).cloned())
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        self.by_id.fetch_add(1, Ordering::SeqCst);
        self.before_call().await?;
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }
}

/// Probe whose outcome and latency are set by the test.
#[derive(Default)]
pub struct StubProbe {
    failing: AtomicBool,
    latency_ms: AtomicU64,
    pub calls: AtomicUsize,
}

impl StubProbe {
    pub fn up() -> Self { Self::default() }

    pub fn failing() -> Self {
        let p = Self::default();
        p.failing.store(true, Ordering::SeqCst);
        p
    }

    pub fn slow(latency: Duration) -> Self {
        let p = Self::default();
        p.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
        p
    }
}

#[async_trait]
impl Probe for StubProbe {
    async fn ping(&self) -> Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            Err("connection refused".into())
        } else {
            Ok(())
        }
    }
}
