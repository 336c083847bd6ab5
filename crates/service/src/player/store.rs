use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::domain::{Player, PlayerId};
use super::errors::RepositoryError;
use crate::health::Probe;

/// Authoritative relational store behind the durable backend.
///
/// The store enforces username uniqueness itself (unique index), so callers
/// only translate the violation into `RepositoryError::Conflict`.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Insert and return the stored row with its assigned id and timestamps.
    async fn insert(&self, player: &Player) -> Result<Player, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Player>, RepositoryError>;
    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, RepositoryError>;
}

/// SeaORM-backed store implementation.
#[derive(Clone)]
pub struct SeaOrmPlayerStore {
    pub db: DatabaseConnection,
}

impl SeaOrmPlayerStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl PlayerStore for SeaOrmPlayerStore {
    async fn insert(&self, player: &Player) -> Result<Player, RepositoryError> {
        let created = models::player::create(&self.db, &player.username, &player.secret, player.balance).await?;
        Ok(created.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Player>, RepositoryError> {
        let found = models::player::find_by_username(&self.db, username).await?;
        Ok(found.map(Player::from))
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        let found = models::player::find_by_id(&self.db, id).await?;
        Ok(found.map(Player::from))
    }
}

#[async_trait]
impl Probe for SeaOrmPlayerStore {
    async fn ping(&self) -> Result<(), String> {
        self.db.ping().await.map_err(|e| e.to_string())
    }
}
