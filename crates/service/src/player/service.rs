use std::sync::Arc;

use common::RequestContext;
use tracing::{debug, instrument};

use super::domain::{PlayerId, PlayerView};
use super::repository::PlayerRepository;
use crate::errors::ServiceError;

/// Read-side player use cases.
pub struct PlayerService<R: PlayerRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: PlayerRepository + ?Sized> Clone for PlayerService<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo) }
    }
}

impl<R: PlayerRepository + ?Sized> PlayerService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Public profile of a player.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::RequestContext;
    /// use service::player::{MemoryPlayerRepository, Player, PlayerRepository, PlayerService};
    /// let repo = Arc::new(MemoryPlayerRepository::new());
    /// let ctx = RequestContext::background();
    /// let mut alice = Player::new("alice", "s3cret");
    /// tokio_test::block_on(repo.create_player(&ctx, &mut alice)).unwrap();
    /// let svc = PlayerService::new(repo);
    /// let view = tokio_test::block_on(svc.get_player_info(&ctx, alice.id)).unwrap();
    /// assert_eq!(view.username, "alice");
    /// ```
    #[instrument(skip(self, ctx), fields(trace_id = %ctx.trace_id(), player_id = id))]
    pub async fn get_player_info(&self, ctx: &RequestContext, id: PlayerId) -> Result<PlayerView, ServiceError> {
        if id <= 0 {
            return Err(ServiceError::Validation("player id must be positive".into()));
        }
        match self.repo.get_player_by_id(ctx, id).await? {
            Some(player) => Ok(player.view()),
            None => {
                debug!("player not found");
                Err(ServiceError::not_found("player"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{MemoryPlayerRepository, Player, RepositoryError};

    #[tokio::test]
    async fn returns_view_for_existing_player() {
        let repo = Arc::new(MemoryPlayerRepository::new());
        let ctx = RequestContext::background();
        let mut p = Player::new("alice", "s3cret");
        repo.create_player(&ctx, &mut p).await.unwrap();

        let svc = PlayerService::new(repo);
        let view = svc.get_player_info(&ctx, p.id).await.unwrap();
        assert_eq!(view, p.view());
    }

    #[tokio::test]
    async fn absent_player_is_not_found() {
        let svc = PlayerService::new(Arc::new(MemoryPlayerRepository::new()));
        let err = svc.get_player_info(&RequestContext::background(), 7).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_positive_id_is_rejected() {
        let svc = PlayerService::new(Arc::new(MemoryPlayerRepository::new()));
        let err = svc.get_player_info(&RequestContext::background(), 0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn repository_failure_propagates() {
        let svc = PlayerService::new(Arc::new(MemoryPlayerRepository::new()));
        let ctx = RequestContext::background();
        ctx.cancel();
        let err = svc.get_player_info(&ctx, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(RepositoryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let repo: Arc<dyn PlayerRepository> = Arc::new(MemoryPlayerRepository::new());
        let ctx = RequestContext::background();
        let mut p = Player::new("bob", "pw");
        repo.create_player(&ctx, &mut p).await.unwrap();
        let svc = PlayerService::new(repo);
        assert_eq!(svc.get_player_info(&ctx, 1).await.unwrap().username, "bob");
    }
}
