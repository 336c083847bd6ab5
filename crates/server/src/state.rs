use std::sync::Arc;
use std::time::Duration;

use service::auth::AuthService;
use service::health::HealthChecker;
use service::messaging::MessageProducer;
use service::player::{PlayerRepository, PlayerService};

/// Shared handler state; the repository behind both services is chosen at startup.
#[derive(Clone)]
pub struct AppState {
    pub players: PlayerService<dyn PlayerRepository>,
    pub auth: AuthService<dyn PlayerRepository>,
    pub health: Arc<HealthChecker>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn PlayerRepository>,
        producer: Option<Arc<dyn MessageProducer>>,
        health: HealthChecker,
        request_timeout: Duration,
    ) -> Self {
        let mut auth = AuthService::new(Arc::clone(&repo));
        if let Some(producer) = producer {
            auth = auth.with_producer(producer);
        }
        Self {
            players: PlayerService::new(repo),
            auth,
            health: Arc::new(health),
            request_timeout,
        }
    }
}
