use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber with compact stdout output.
///
/// `RUST_LOG` takes precedence; without it the filter defaults to
/// `info,tower_http=info,axum=info`. Logs go to stdout so container
/// environments that hide stderr still show them.
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(|| io::stdout())
        .try_init();
}

/// JSON variant of [`init_logging_default`] for structured log pipelines.
/// 默认 info，可通过 RUST_LOG 覆盖，例如 RUST_LOG=info,server=debug
pub fn init_logging_json() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .json()
        .with_writer(|| io::stdout())
        .try_init();
}
