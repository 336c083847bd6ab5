use async_trait::async_trait;
use common::RequestContext;

use super::domain::{Player, PlayerId};
use super::errors::RepositoryError;

/// Capability contract shared by every player backend.
///
/// Implementations are long-lived and shared across requests; all methods must
/// tolerate unbounded concurrent callers. Each call is bound by `ctx`.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Persist `player`, overwriting its `id` and timestamps with the assigned values.
    /// Any `id` on input is ignored. Duplicate usernames yield `RepositoryError::Conflict`.
    async fn create_player(&self, ctx: &RequestContext, player: &mut Player) -> Result<(), RepositoryError>;

    async fn get_player_by_username(&self, ctx: &RequestContext, username: &str) -> Result<Option<Player>, RepositoryError>;

    /// May be served from a cache; see `CachedPlayerRepository`.
    async fn get_player_by_id(&self, ctx: &RequestContext, id: PlayerId) -> Result<Option<Player>, RepositoryError>;
}

/// Input checks common to both backends.
pub(crate) fn validate_new_player(player: &Player) -> Result<(), RepositoryError> {
    models::player::validate_username(&player.username)?;
    models::player::validate_password(&player.secret)?;
    models::player::validate_balance(player.balance)?;
    Ok(())
}
