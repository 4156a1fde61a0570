use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

/// Resolve the tokio worker thread count: config.toml first, then the
/// TOKIO_WORKER_THREADS environment variable.
fn worker_threads() -> Option<usize> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()),
    }
}

fn main() -> std::process::ExitCode {
    // .env 先于日志初始化加载，保证 RUST_LOG 生效
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    info!(
        service = "qa-server",
        event = "start",
        %service_id,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        "qa server starting"
    );

    // Panic 钩子：异常统一走 tracing，避免 stderr 丢失
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "qa-server",
            event = "panic",
            %service_id,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let threads = worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "qa-server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    // 运行服务并监听 Ctrl+C 停机
    rt.block_on(async {
        tokio::select! {
            res = server::run() => match res {
                Ok(()) => {
                    info!(service = "qa-server", event = "stop", %service_id, pid, "server stopped normally");
                    std::process::ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(service = "qa-server", event = "run_failed", error = %e, "server::run returned error");
                    std::process::ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(service = "qa-server", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                std::process::ExitCode::SUCCESS
            }
        }
    })
}
