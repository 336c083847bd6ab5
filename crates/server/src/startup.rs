use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use configs::{AppConfig, PersistenceMode};
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use service::cache::{CacheClient, RedisCache};
use service::health::{Dependency, HealthChecker, HealthDependencies};
use service::messaging::{MessageProducer, NoopProducer};
use service::player::{CachedPlayerRepository, MemoryPlayerRepository, PlayerRepository, PlayerStore, SeaOrmPlayerStore};

use crate::routes;
use crate::state::AppState;

/// Long-lived handles that need an orderly shutdown.
pub struct Resources {
    pub producer: Option<Arc<dyn MessageProducer>>,
}

impl Resources {
    pub async fn shutdown(&self) {
        if let Some(producer) = &self.producer {
            if let Err(e) = producer.shutdown().await {
                warn!(error = %e, "message producer shutdown failed");
            }
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

struct Backend {
    repo: Arc<dyn PlayerRepository>,
    database: Dependency,
    cache: Dependency,
}

fn memory_backend() -> Backend {
    info!(mode = "memory", "using in-memory player repository; data is lost on restart");
    Backend {
        repo: Arc::new(MemoryPlayerRepository::new()),
        database: Dependency::Disabled,
        cache: Dependency::Disabled,
    }
}

async fn durable_backend(cfg: &AppConfig) -> anyhow::Result<Backend> {
    let db = models::db::connect_with_config(&cfg.database).await.context("connect database")?;
    migration::Migrator::up(&db, None).await.context("run migrations")?;
    info!("database migrations applied");
    let store = Arc::new(SeaOrmPlayerStore::new(db));

    // Redis 连接失败不阻止启动：降级为直连数据库，健康检查报告 DOWN
    let (cache, cache_dep): (Option<Arc<dyn CacheClient>>, Dependency) = if !cfg.redis.enabled {
        info!("redis disabled; durable backend runs without cache");
        (None, Dependency::Disabled)
    } else {
        let timeout = Duration::from_millis(cfg.redis.connect_timeout_ms);
        match RedisCache::connect(&cfg.redis.url, timeout).await {
            Ok(redis) => {
                let redis = Arc::new(redis);
                (Some(redis.clone() as Arc<dyn CacheClient>), Dependency::Live(redis))
            }
            Err(e) => {
                error!(error = %e, "redis unavailable; continuing without cache");
                (None, Dependency::Missing(e.to_string()))
            }
        }
    };

    let repo = CachedPlayerRepository::new(store.clone() as Arc<dyn PlayerStore>, cache);
    Ok(Backend { repo: Arc::new(repo), database: Dependency::Live(store), cache: cache_dep })
}

async fn messaging(cfg: &AppConfig) -> anyhow::Result<Option<Arc<NoopProducer>>> {
    if !cfg.messaging.enabled {
        return Ok(None);
    }
    let producer = Arc::new(NoopProducer::new(cfg.messaging.namesrv_addr.clone()));
    producer.start().await.context("start message producer")?;
    Ok(Some(producer))
}

/// Wire the backend selected by `persistence.mode` plus its health dependencies.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<(AppState, Resources)> {
    let mode = cfg.persistence.mode;
    let backend = match mode {
        PersistenceMode::Memory => memory_backend(),
        PersistenceMode::Durable => durable_backend(cfg).await?,
    };

    let producer = messaging(cfg).await?;
    let messaging_dep = match &producer {
        Some(p) => Dependency::Live(p.clone()),
        None => Dependency::Disabled,
    };
    let producer = producer.map(|p| p as Arc<dyn MessageProducer>);

    let health = HealthChecker::from_config(
        &cfg.health_check,
        mode,
        HealthDependencies { database: backend.database, cache: backend.cache, messaging: messaging_dep },
    );
    let state = AppState::new(
        backend.repo,
        producer.clone(),
        health,
        Duration::from_millis(cfg.server.request_timeout_ms),
    );
    Ok((state, Resources { producer }))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (state, resources) = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .context("invalid server.host/server.port")?;
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("bind {addr}"))?;
    info!(%addr, mode = cfg.persistence.mode.as_str(), "player service listening");

    let grace = Duration::from_secs(cfg.server.shutdown_timeout_secs);
    let served = async move { axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await };
    // 收到信号后最多等待 grace 时间让在途请求完成
    let result = tokio::select! {
        res = served => res.map_err(anyhow::Error::from),
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_secs = grace.as_secs(), "graceful shutdown timed out; forcing exit");
            Ok(())
        }
    };

    resources.shutdown().await;
    info!("server stopped");
    result
}
