use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            request_timeout_ms: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `console` or `json`
    #[serde(default = "default_log_encoding")]
    pub encoding: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { level: default_log_level(), encoding: default_log_encoding() }
    }
}

/// Which player repository backend the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Volatile in-process map; data is lost on restart.
    #[default]
    Memory,
    /// Relational store fronted by a read-through cache.
    #[serde(alias = "mysql", alias = "postgres")]
    Durable,
}

impl PersistenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistenceMode::Memory => "memory",
            PersistenceMode::Durable => "durable",
        }
    }
}

impl std::str::FromStr for PersistenceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(PersistenceMode::Memory),
            "durable" | "mysql" | "postgres" => Ok(PersistenceMode::Durable),
            other => Err(anyhow!("persistence.mode must be `memory` or `durable`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PersistenceConfig {
    #[serde(default, alias = "type")]
    pub mode: PersistenceMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Set to false to run the durable backend without a cache.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_redis_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self { enabled: true, url: String::new(), connect_timeout_ms: default_redis_connect_timeout() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MessagingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub namesrv_addr: String,
    #[serde(default)]
    pub producer_group: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheckConfig {
    /// Probes slower than this are reported DEGRADED.
    #[serde(default = "default_latency_threshold", alias = "latency_threshold")]
    pub latency_threshold_ms: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self { latency_threshold_ms: default_latency_threshold(), probe_timeout_ms: default_probe_timeout() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 5000 }
fn default_shutdown_timeout() -> u64 { 5 }
fn default_log_level() -> String { "info".into() }
fn default_log_encoding() -> String { "console".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_redis_connect_timeout() -> u64 { 3000 }
fn default_latency_threshold() -> u64 { 100 }
fn default_probe_timeout() -> u64 { 2000 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the file is absent,
    /// then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(mode) = std::env::var("PERSISTENCE_MODE") {
            self.persistence.mode = mode.parse()?;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| anyhow!("SERVER_PORT must be a port number"))?;
        }
        // 文件中未提供时才从环境变量填充连接串
        self.database.normalize_from_env();
        self.redis.normalize_from_env();
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.health_check.latency_threshold_ms == 0 {
            return Err(anyhow!("health_check.latency_threshold_ms must be > 0"));
        }
        if self.health_check.probe_timeout_ms == 0 {
            self.health_check.probe_timeout_ms = default_probe_timeout();
        }
        // 内存模式下不需要数据库与 Redis 连接参数
        if self.persistence.mode == PersistenceMode::Durable {
            self.database.validate()?;
            self.redis.validate()?;
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        if self.request_timeout_ms == 0 {
            self.request_timeout_ms = default_request_timeout();
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl RedisConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("REDIS_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
            return Err(anyhow!("redis.url must start with redis:// or rediss:// (or set redis.enabled = false)"));
        }
        Ok(())
    }
}
