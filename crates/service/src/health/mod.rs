//! Composite dependency health.
//!
//! Stateless per call: every `check` probes the dependencies relevant to the
//! active persistence mode, classifies each result, and folds them into one
//! composite status. Probe failures are reported, never propagated.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::RequestContext;
use configs::PersistenceMode;
use serde::{Serialize, Serializer};
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Liveness round-trip against a dependency handle.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn ping(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Degraded,
    Down,
    Disabled,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Up => "UP",
            HealthStatus::Degraded => "DEGRADED",
            HealthStatus::Down => "DOWN",
            HealthStatus::Disabled => "DISABLED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "latency_str")]
    pub latency: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn new(status: HealthStatus) -> Self {
        Self { status, latency: None, details: None, message: None }
    }

    pub fn disabled() -> Self {
        Self::new(HealthStatus::Disabled)
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), ..Self::new(HealthStatus::Down) }
    }
}

fn latency_str<S: Serializer>(latency: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match latency {
        Some(d) => s.serialize_str(&format!("{:?}", d)),
        None => s.serialize_none(),
    }
}

/// How a dependency is wired for this process.
#[derive(Clone)]
pub enum Dependency {
    /// Not used in the active configuration.
    Disabled,
    /// Required but its handle could not be initialised.
    Missing(String),
    Live(Arc<dyn Probe>),
}

#[derive(Clone)]
pub struct HealthDependencies {
    pub database: Dependency,
    pub cache: Dependency,
    pub messaging: Dependency,
}

/// Process and runtime snapshot taken at check time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMetrics {
    pub pid: u32,
    pub worker_threads: usize,
    pub alive_tasks: usize,
}

impl SystemMetrics {
    pub fn capture() -> Self {
        let (worker_threads, alive_tasks) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let m = handle.metrics();
                (m.num_workers(), m.num_alive_tasks())
            }
            Err(_) => (0, 0),
        };
        Self { pid: std::process::id(), worker_threads, alive_tasks }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub uptime: String,
    pub version: &'static str,
    pub system: SystemMetrics,
    pub components: BTreeMap<String, ComponentStatus>,
}

impl HealthReport {
    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}

pub struct HealthChecker {
    mode: PersistenceMode,
    deps: HealthDependencies,
    latency_threshold: Duration,
    probe_timeout: Duration,
    started_at: Instant,
}

impl HealthChecker {
    pub fn new(mode: PersistenceMode, deps: HealthDependencies, latency_threshold: Duration, probe_timeout: Duration) -> Self {
        Self { mode, deps, latency_threshold, probe_timeout, started_at: Instant::now() }
    }

    pub fn from_config(cfg: &configs::HealthCheckConfig, mode: PersistenceMode, deps: HealthDependencies) -> Self {
        Self::new(
            mode,
            deps,
            Duration::from_millis(cfg.latency_threshold_ms),
            Duration::from_millis(cfg.probe_timeout_ms),
        )
    }

    #[instrument(skip(self, ctx), fields(trace_id = %ctx.trace_id(), mode = self.mode.as_str()))]
    pub async fn check(&self, ctx: &RequestContext) -> HealthReport {
        let mut components = BTreeMap::new();

        match self.mode {
            PersistenceMode::Memory => {
                components.insert(
                    "memory_store".to_string(),
                    ComponentStatus { details: Some("in-memory persistence enabled".into()), ..ComponentStatus::new(HealthStatus::Up) },
                );
                components.insert("database".to_string(), ComponentStatus::disabled());
                components.insert("redis".to_string(), ComponentStatus::disabled());
                let messaging = self.probe(ctx, "messaging", &self.deps.messaging).await;
                components.insert("messaging".to_string(), messaging);
            }
            PersistenceMode::Durable => {
                let (database, redis, messaging) = tokio::join!(
                    self.probe(ctx, "database", &self.deps.database),
                    self.probe(ctx, "redis", &self.deps.cache),
                    self.probe(ctx, "messaging", &self.deps.messaging),
                );
                components.insert("database".to_string(), database);
                components.insert("redis".to_string(), redis);
                components.insert("messaging".to_string(), messaging);
            }
        }

        let report = HealthReport {
            status: composite(components.values().map(|c| c.status)),
            uptime: format!("{:?}", self.started_at.elapsed()),
            version: env!("CARGO_PKG_VERSION"),
            system: SystemMetrics::capture(),
            components,
        };
        debug!(status = report.status.as_str(), "health check complete");
        report
    }

    async fn probe(&self, ctx: &RequestContext, name: &str, dep: &Dependency) -> ComponentStatus {
        let probe = match dep {
            Dependency::Disabled => return ComponentStatus::disabled(),
            Dependency::Missing(reason) => {
                warn!(component = name, reason = %reason, "dependency not initialised");
                return ComponentStatus::down(format!("{name} client not initialized: {reason}"));
            }
            Dependency::Live(probe) => probe,
        };

        // 探测超时取 probe_timeout 与请求剩余时间的较小者
        let bounded = ctx.clone().with_timeout(self.probe_timeout);
        let start = Instant::now();
        let outcome = match bounded.run(probe.ping()).await {
            Ok(res) => res,
            Err(e) => Err(e.to_string()),
        };
        let status = classify(outcome, start.elapsed(), self.latency_threshold);
        match status.status {
            HealthStatus::Down => error!(component = name, detail = ?status.message, "health probe failed"),
            HealthStatus::Degraded => warn!(component = name, latency = ?status.latency, "health probe slow"),
            _ => {}
        }
        status
    }
}

/// Per-dependency status from one probe outcome.
pub fn classify(outcome: Result<(), String>, latency: Duration, threshold: Duration) -> ComponentStatus {
    match outcome {
        Err(e) => ComponentStatus { latency: Some(latency), ..ComponentStatus::down(format!("ping failed: {e}")) },
        Ok(()) if latency > threshold => ComponentStatus {
            latency: Some(latency),
            message: Some(format!("high latency: {:?} > {}ms", latency, threshold.as_millis())),
            ..ComponentStatus::new(HealthStatus::Degraded)
        },
        Ok(()) => ComponentStatus { latency: Some(latency), ..ComponentStatus::new(HealthStatus::Up) },
    }
}

/// `Up` when every non-disabled component is `Up`, otherwise `Degraded`.
pub fn composite(statuses: impl IntoIterator<Item = HealthStatus>) -> HealthStatus {
    let all_up = statuses
        .into_iter()
        .filter(|s| *s != HealthStatus::Disabled)
        .all(|s| s == HealthStatus::Up);
    if all_up { HealthStatus::Up } else { HealthStatus::Degraded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubProbe;
    use std::sync::atomic::Ordering;

    const THRESHOLD: Duration = Duration::from_millis(100);
    const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

    fn live(p: StubProbe) -> Dependency {
        Dependency::Live(Arc::new(p))
    }

    fn durable(database: Dependency, cache: Dependency) -> HealthChecker {
        HealthChecker::new(
            PersistenceMode::Durable,
            HealthDependencies { database, cache, messaging: Dependency::Disabled },
            THRESHOLD,
            PROBE_TIMEOUT,
        )
    }

    #[test]
    fn composite_ignores_disabled() {
        use HealthStatus::*;
        assert_eq!(composite([Up, Disabled, Up]), Up);
        assert_eq!(composite([Disabled, Disabled]), Up);
        assert_eq!(composite([Up, Degraded]), Degraded);
        assert_eq!(composite([Down, Up]), Degraded);
    }

    #[test]
    fn classify_thresholds() {
        assert_eq!(classify(Ok(()), Duration::from_millis(5), THRESHOLD).status, HealthStatus::Up);
        assert_eq!(classify(Ok(()), THRESHOLD, THRESHOLD).status, HealthStatus::Up);
        assert_eq!(classify(Ok(()), Duration::from_millis(101), THRESHOLD).status, HealthStatus::Degraded);
        let down = classify(Err("refused".into()), Duration::from_millis(1), THRESHOLD);
        assert_eq!(down.status, HealthStatus::Down);
        assert!(down.message.unwrap().contains("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_store_probe_is_down_and_composite_degraded() {
        let checker = durable(live(StubProbe::failing()), live(StubProbe::up()));
        let report = checker.check(&RequestContext::background()).await;
        assert_eq!(report.components["database"].status, HealthStatus::Down);
        assert_eq!(report.components["redis"].status, HealthStatus::Up);
        assert_eq!(report.components["messaging"].status, HealthStatus::Disabled);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.is_up());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_is_degraded() {
        let checker = durable(live(StubProbe::up()), live(StubProbe::slow(Duration::from_millis(250))));
        let report = checker.check(&RequestContext::background()).await;
        let redis = &report.components["redis"];
        assert_eq!(redis.status, HealthStatus::Degraded);
        assert!(redis.latency.unwrap() >= Duration::from_millis(250));
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn all_up_is_up() {
        let checker = durable(live(StubProbe::up()), live(StubProbe::up()));
        let report = checker.check(&RequestContext::background()).await;
        assert_eq!(report.status, HealthStatus::Up);
        assert!(report.is_up());
    }

    #[tokio::test]
    async fn memory_mode_disables_store_and_cache() {
        let db = Arc::new(StubProbe::failing());
        let checker = HealthChecker::new(
            PersistenceMode::Memory,
            HealthDependencies {
                database: Dependency::Live(db.clone()),
                cache: Dependency::Missing("never connected".into()),
                messaging: Dependency::Disabled,
            },
            THRESHOLD,
            PROBE_TIMEOUT,
        );
        let report = checker.check(&RequestContext::background()).await;
        assert_eq!(report.components["database"].status, HealthStatus::Disabled);
        assert_eq!(report.components["redis"].status, HealthStatus::Disabled);
        assert_eq!(report.components["memory_store"].status, HealthStatus::Up);
        assert_eq!(report.status, HealthStatus::Up);
        assert_eq!(db.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_handle_is_down() {
        let checker = durable(live(StubProbe::up()), Dependency::Missing("connection refused".into()));
        let report = checker.check(&RequestContext::background()).await;
        let redis = &report.components["redis"];
        assert_eq!(redis.status, HealthStatus::Down);
        assert!(redis.latency.is_none());
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probe_is_cut_by_request_deadline() {
        let checker = durable(live(StubProbe::slow(Duration::from_secs(60))), live(StubProbe::up()));
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(500));
        let started = Instant::now();
        let report = checker.check(&ctx).await;
        assert_eq!(report.components["database"].status, HealthStatus::Down);
        assert!(started.elapsed() < PROBE_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probe_is_cut_by_probe_timeout() {
        let checker = durable(live(StubProbe::up()), live(StubProbe::slow(Duration::from_secs(60))));
        let report = checker.check(&RequestContext::background()).await;
        let redis = &report.components["redis"];
        assert_eq!(redis.status, HealthStatus::Down);
        assert!(redis.latency.unwrap() >= PROBE_TIMEOUT);
    }

    #[tokio::test]
    async fn report_serialises_uppercase_statuses() {
        let checker = durable(live(StubProbe::up()), live(StubProbe::failing()));
        let report = checker.check(&RequestContext::background()).await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "DEGRADED");
        assert_eq!(json["components"]["redis"]["status"], "DOWN");
        assert_eq!(json["components"]["messaging"]["status"], "DISABLED");
        assert!(json["components"]["database"]["latency"].is_string());
        assert!(json["components"]["messaging"].get("latency").is_none());
        assert!(json["version"].is_string());
        assert_eq!(json["system"]["pid"], std::process::id());
        assert!(json["system"]["worker_threads"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn status_names_match_wire_format() {
        for s in [HealthStatus::Up, HealthStatus::Degraded, HealthStatus::Down, HealthStatus::Disabled] {
            assert_eq!(serde_json::to_value(s).unwrap(), s.as_str());
        }
    }

    #[test]
    fn system_metrics_outside_runtime_report_zero_workers() {
        let m = SystemMetrics::capture();
        assert_eq!(m.pid, std::process::id());
        assert_eq!(m.worker_threads, 0);
    }
}
