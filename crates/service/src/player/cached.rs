//! Durable backend: relational store with a read-through cache for id lookups.
//!
//! `get_player_by_id` is cache-aside: a well-formed entry under `player:<id>`
//! is returned as is; a miss, a cache failure or an undecodable entry falls
//! through to the store, and a store hit is written back with a fixed TTL.
//! Entries may be stale for at most that TTL. Concurrent misses for the same
//! id each query the store; there is no request coalescing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::RequestContext;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::domain::{Player, PlayerId};
use super::errors::RepositoryError;
use super::repository::{validate_new_player, PlayerRepository};
use super::store::PlayerStore;
use crate::cache::CacheClient;

/// Lifetime of a cached player entry.
pub const PLAYER_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub fn cache_key(id: PlayerId) -> String {
    format!("player:{id}")
}

/// Cache wire format. Carries the secret so a cached read is field-for-field
/// identical to a store read.
#[derive(Serialize, Deserialize)]
struct CacheEntry {
    id: PlayerId,
    username: String,
    secret: String,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Player> for CacheEntry {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            username: p.username.clone(),
            secret: p.secret.clone(),
            balance: p.balance,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<CacheEntry> for Player {
    fn from(e: CacheEntry) -> Self {
        Self {
            id: e.id,
            username: e.username,
            secret: e.secret,
            balance: e.balance,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

pub struct CachedPlayerRepository {
    store: Arc<dyn PlayerStore>,
    cache: Option<Arc<dyn CacheClient>>,
}

impl CachedPlayerRepository {
    /// `cache = None` runs straight against the store.
    pub fn new(store: Arc<dyn PlayerStore>, cache: Option<Arc<dyn CacheClient>>) -> Self {
        Self { store, cache }
    }

    async fn read_cache(&self, ctx: &RequestContext, cache: &dyn CacheClient, key: &str, id: PlayerId) -> Option<Player> {
        let bytes = match ctx.run(cache.get(key)).await {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                debug!("cache miss");
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "cache read failed; falling back to store");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "cache read interrupted; falling back to store");
                return None;
            }
        };
        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.id == id => {
                debug!("player served from cache");
                Some(entry.into())
            }
            Ok(entry) => {
                warn!(cached_id = entry.id, "cache entry id mismatch; falling back to store");
                None
            }
            Err(e) => {
                warn!(error = %e, "undecodable cache entry; falling back to store");
                None
            }
        }
    }

    /// Best effort: failures are logged and dropped.
    async fn write_cache(&self, ctx: &RequestContext, cache: &dyn CacheClient, key: &str, player: &Player) {
        let bytes = match serde_json::to_vec(&CacheEntry::from(player)) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to encode player for cache");
                return;
            }
        };
        match ctx.run(cache.set_ex(key, &bytes, PLAYER_CACHE_TTL)).await {
            Ok(Ok(())) => debug!("player cached"),
            Ok(Err(e)) => warn!(error = %e, "cache write failed"),
            Err(e) => warn!(error = %e, "cache write interrupted"),
        }
    }
}

#[async_trait]
impl PlayerRepository for CachedPlayerRepository {
    #[instrument(skip(self, ctx, player), fields(trace_id = %ctx.trace_id(), username = %player.username))]
    async fn create_player(&self, ctx: &RequestContext, player: &mut Player) -> Result<(), RepositoryError> {
        validate_new_player(player)?;
        let stored = match ctx.run(self.store.insert(player)).await? {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, code = e.code(), "failed to create player");
                return Err(e);
            }
        };
        player.id = stored.id;
        player.balance = stored.balance;
        player.created_at = stored.created_at;
        player.updated_at = stored.updated_at;
        info!(player_id = player.id, "player_created");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(trace_id = %ctx.trace_id()))]
    async fn get_player_by_username(&self, ctx: &RequestContext, username: &str) -> Result<Option<Player>, RepositoryError> {
        ctx.run(self.store.find_by_username(username)).await?
    }

    #[instrument(skip(self, ctx), fields(trace_id = %ctx.trace_id(), player_id = id))]
    async fn get_player_by_id(&self, ctx: &RequestContext, id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        let key = cache_key(id);
        if let Some(cache) = &self.cache {
            if let Some(hit) = self.read_cache(ctx, cache.as_ref(), &key, id).await {
                return Ok(Some(hit));
            }
        }

        let Some(player) = ctx.run(self.store.find_by_id(id)).await?? else {
            return Ok(None);
        };

        if let Some(cache) = &self.cache {
            self.write_cache(ctx, cache.as_ref(), &key, &player).await;
        }
        Ok(Some(player))
    }
}
