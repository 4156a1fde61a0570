use axum::{extract::{Path, State}, http::StatusCode, Json};
use service::errors::ServiceError;
use service::file::qa_store::Question;
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// 列出全部问题（包含内嵌答案）
pub async fn list(State(state): State<ServerState>) -> Json<Vec<Question>> {
    Json(state.qa_store.list_questions().await)
}

/// 创建新的问题；id 由存储分配，载荷中的 id 被忽略
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<Question>,
) -> (StatusCode, Json<Question>) {
    let created = state.qa_store.create_question(input).await;
    info!(id = created.id, "created question");
    (StatusCode::CREATED, Json(created))
}

/// 获取编号为 id 的问题
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<Question>, JsonApiError> {
    state.qa_store.get_question(id).await
        .map(Json)
        .map_err(|e| match e {
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            _ => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())),
        })
}

/// 修改编号为 id 的问题
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(input): Json<Question>,
) -> Result<Json<Question>, JsonApiError> {
    state.qa_store.update_question(id, input).await
        .map(|q| { info!(id = q.id, "updated question"); Json(q) })
        .map_err(|e| match e {
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            _ => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())),
        })
}
