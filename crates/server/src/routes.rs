use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::{info, Level};

use common::types::Health;
use service::file::qa_store::QaStore;

use crate::errors::JsonApiError;

pub mod questions;
pub mod answers;

/// Shared state handed to every API handler.
#[derive(Clone)]
pub struct ServerState {
    pub qa_store: Arc<QaStore>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// 将当前问题集合保存到数据文件
async fn save(State(state): State<ServerState>) -> Result<Json<serde_json::Value>, JsonApiError> {
    state
        .qa_store
        .save()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Save Failed", Some(e.to_string())))?;
    info!("question collection saved");
    Ok(Json(serde_json::json!({"message": "Data saved successfully"})))
}

/// Build the full application router: health, question/answer CRUD, save
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    // Public routes
    let public = Router::new().route("/health", get(health));

    // Question/answer API routes
    let api = Router::new()
        .route("/api/question", get(questions::list).post(questions::create))
        .route("/api/question/:id", get(questions::get).put(questions::update))
        .route("/api/question/:id/answer", get(answers::list).post(answers::create))
        .route(
            "/api/question/:id/answer/:answer_id",
            get(answers::get).put(answers::update),
        )
        .route("/api/save", post(save));

    // Compose
    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            // 请求级 span 与打点：INFO 记录请求/响应，5xx 以 ERROR 记录
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
