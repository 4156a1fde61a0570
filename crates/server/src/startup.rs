use std::{env, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};
use service::{file::qa_store::QaStore, runtime};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Resolve the question store file from configs or env vars
fn load_data_file() -> String {
    let fallback = || env::var("QA_DATA_FILE").unwrap_or_else(|_| "data/questions.json".to_string());
    match configs::load_default() {
        Ok(cfg) => {
            let mut store = cfg.store;
            store.normalize_from_env();
            if store.data_file.trim().is_empty() { fallback() } else { store.data_file }
        }
        Err(_) => fallback(),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let data_file = load_data_file();
    if let Some(parent) = Path::new(&data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        runtime::ensure_data_dir(&parent.to_string_lossy()).await?;
    }

    // 问题存储（文件持久化；数据文件缺失或损坏时拒绝启动）
    let qa_store = QaStore::open(&data_file)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load questions: {e}"))?;
    info!(%data_file, count = qa_store.list_questions().await.len(), "questions loaded from file");

    let state = ServerState { qa_store: Arc::clone(&qa_store) };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting qa server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
