use std::sync::Arc;

use common::RequestContext;
use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn};

use super::domain::{LoginInput, LoginOutput, PlayerRegistered, RegisterInput};
use super::errors::AuthError;
use crate::messaging::{MessageProducer, TOPIC_PLAYER_REGISTERED};
use crate::player::{Player, PlayerRepository, PlayerView};

/// Auth business service independent of web framework
pub struct AuthService<R: PlayerRepository + ?Sized> {
    repo: Arc<R>,
    producer: Option<Arc<dyn MessageProducer>>,
}

impl<R: PlayerRepository + ?Sized> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo), producer: self.producer.clone() }
    }
}

impl<R: PlayerRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, producer: None } }

    pub fn with_producer(mut self, producer: Arc<dyn MessageProducer>) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Create a player account.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::RequestContext;
    /// use service::auth::{domain::RegisterInput, AuthService};
    /// use service::player::MemoryPlayerRepository;
    /// let svc = AuthService::new(Arc::new(MemoryPlayerRepository::new()));
    /// let input = RegisterInput { username: "alice".into(), password: "s3cret".into(), balance: None };
    /// let view = tokio_test::block_on(svc.register(&RequestContext::background(), input)).unwrap();
    /// assert_eq!(view.id, 1);
    /// assert_eq!(view.balance.to_string(), "0.00");
    /// ```
    #[instrument(skip(self, ctx, input), fields(trace_id = %ctx.trace_id(), username = %input.username))]
    pub async fn register(&self, ctx: &RequestContext, input: RegisterInput) -> Result<PlayerView, AuthError> {
        let balance = input.balance.unwrap_or(Decimal::ZERO);
        let mut player = Player::new(input.username, input.password).with_balance(balance);
        if let Err(e) = self.repo.create_player(ctx, &mut player).await {
            let e = AuthError::from(e);
            match &e {
                AuthError::Repository(inner) => error!(error = %inner, "failed to create player"),
                other => debug!(error = %other, "registration rejected"),
            }
            return Err(e);
        }
        info!(player_id = player.id, "player_registered");

        self.publish_registered(ctx, &player).await;
        Ok(player.view())
    }

    /// Authenticate a player and issue a placeholder token.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::RequestContext;
    /// use service::auth::{domain::{LoginInput, RegisterInput}, AuthService};
    /// use service::player::MemoryPlayerRepository;
    /// let svc = AuthService::new(Arc::new(MemoryPlayerRepository::new()));
    /// let ctx = RequestContext::background();
    /// let _ = tokio_test::block_on(svc.register(&ctx, RegisterInput { username: "u".into(), password: "pw".into(), balance: None }));
    /// let out = tokio_test::block_on(svc.login(&ctx, LoginInput { username: "u".into(), password: "pw".into() })).unwrap();
    /// assert_eq!(out.token, "mock-jwt-token-for-player-1");
    /// ```
    #[instrument(skip(self, ctx, input), fields(trace_id = %ctx.trace_id(), username = %input.username))]
    pub async fn login(&self, ctx: &RequestContext, input: LoginInput) -> Result<LoginOutput, AuthError> {
        let player = match self.repo.get_player_by_username(ctx, &input.username).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                warn!("login attempt with unknown username");
                return Err(AuthError::Unauthorized);
            }
            Err(e) => {
                error!(error = %e, "failed to load player for login");
                return Err(AuthError::Repository(e));
            }
        };

        // 明文比较，仅占位
        if player.secret != input.password {
            warn!(player_id = player.id, "login attempt with wrong password");
            return Err(AuthError::Unauthorized);
        }

        info!(player_id = player.id, "player_logged_in");
        Ok(LoginOutput { token: format!("mock-jwt-token-for-player-{}", player.id) })
    }

    /// Failures are logged and dropped; registration has already succeeded.
    async fn publish_registered(&self, ctx: &RequestContext, player: &Player) {
        let Some(producer) = &self.producer else { return };
        let event = PlayerRegistered { player_id: player.id, username: &player.username };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to encode registration event");
                return;
            }
        };
        let keys = [player.id.to_string()];
        match ctx.run(producer.send(ctx, TOPIC_PLAYER_REGISTERED, &payload, &keys)).await {
            Ok(Ok(receipt)) => debug!(msg_id = %receipt.msg_id, "registration event published"),
            Ok(Err(e)) => warn!(error = %e, "failed to publish registration event"),
            Err(e) => warn!(error = %e, "registration event publish interrupted"),
        }
    }
}
