use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing subscriber from the `logger` config section.
/// - Respects `RUST_LOG` if set, otherwise uses `level`
/// - `encoding = "json"` emits structured JSON (span fields such as `trace_id` included),
///   anything else falls back to the compact console format
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging(level: &str, encoding: &str) {
    // 默认对 sea_orm / sqlx 只输出 warn，避免每条 SQL 都刷屏
    let fallback = format!("{level},sqlx=warn,sea_orm=warn,tower_http=info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = fmt().with_env_filter(env_filter).with_target(false).with_writer(io::stdout);
    let _ = if encoding.eq_ignore_ascii_case("json") {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };
}

/// Console logging at `info`, used before configuration is available.
pub fn init_logging_default() {
    init_logging("info", "console");
}
