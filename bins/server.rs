use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // 提前加载 .env，使得 RUST_LOG / PERSISTENCE_MODE 等环境变量生效
    dotenv().ok();

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "player_service", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(&cfg.logger.level, &cfg.logger.encoding);

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志，便于排查问题
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "player_service",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "player_service", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "player_service",
        event = "start",
        %service_id,
        pid,
        version,
        mode = cfg.persistence.mode.as_str(),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "player service starting"
    );

    // 优雅停机由 server::run 内部处理
    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "player_service", event = "stop", %service_id, pid, "server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "player_service", event = "run_failed", error = ?e, "server::run returned error");
            ExitCode::FAILURE
        }
    }
}
