//! Volatile in-process backend for local runs and tests.
//!
//! All data lives in a map guarded by one reader/writer lock; losing the
//! process loses every player. Username uniqueness is a linear scan under the
//! write lock, fine for the small datasets this backend is meant for.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use common::RequestContext;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::domain::{money, Player, PlayerId};
use super::errors::RepositoryError;
use super::repository::{validate_new_player, PlayerRepository};

struct Inner {
    players: HashMap<PlayerId, Player>,
    next_id: PlayerId,
}

pub struct MemoryPlayerRepository {
    inner: RwLock<Inner>,
}

impl MemoryPlayerRepository {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner { players: HashMap::new(), next_id: 1 }) }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.players.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerRepository for MemoryPlayerRepository {
    #[instrument(skip(self, ctx, player), fields(trace_id = %ctx.trace_id(), username = %player.username))]
    async fn create_player(&self, ctx: &RequestContext, player: &mut Player) -> Result<(), RepositoryError> {
        validate_new_player(player)?;
        let mut inner = ctx.run(self.inner.write()).await?;

        if inner.players.values().any(|p| p.username == player.username) {
            debug!("username already taken");
            return Err(RepositoryError::Conflict);
        }

        let now = Utc::now();
        player.id = inner.next_id;
        inner.next_id += 1;
        player.created_at = now;
        player.updated_at = now;
        player.balance = money(player.balance);

        inner.players.insert(player.id, player.clone());
        drop(inner);
        info!(player_id = player.id, "player_created");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(trace_id = %ctx.trace_id()))]
    async fn get_player_by_username(&self, ctx: &RequestContext, username: &str) -> Result<Option<Player>, RepositoryError> {
        let inner = ctx.run(self.inner.read()).await?;
        Ok(inner.players.values().find(|p| p.username == username).cloned())
    }

    #[instrument(skip(self, ctx), fields(trace_id = %ctx.trace_id()))]
    async fn get_player_by_id(&self, ctx: &RequestContext, id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        let inner = ctx.run(self.inner.read()).await?;
        Ok(inner.players.get(&id).cloned())
    }
}
