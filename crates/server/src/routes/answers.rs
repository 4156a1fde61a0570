use axum::{extract::{Path, State}, http::StatusCode, Json};
use service::errors::ServiceError;
use service::file::qa_store::Answer;
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

fn map_store_error(e: ServiceError) -> JsonApiError {
    match e {
        ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
        _ => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())),
    }
}

/// 创建答案：答案编号在所属问题内递增，question_id 由存储回填
pub async fn create(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(input): Json<Answer>,
) -> Result<(StatusCode, Json<Answer>), JsonApiError> {
    state.qa_store.create_answer(id, input).await
        .map(|a| {
            info!(question_id = a.question_id, answer_id = a.id, "created answer");
            (StatusCode::CREATED, Json(a))
        })
        .map_err(map_store_error)
}

/// 获取编号为 id 的问题的答案列表
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Answer>>, JsonApiError> {
    state.qa_store.list_answers(id).await
        .map(Json)
        .map_err(map_store_error)
}

/// 获取编号为 id 的问题下编号为 answer_id 的答案
pub async fn get(
    State(state): State<ServerState>,
    Path((id, answer_id)): Path<(u64, u64)>,
) -> Result<Json<Answer>, JsonApiError> {
    state.qa_store.get_answer(id, answer_id).await
        .map(Json)
        .map_err(map_store_error)
}

/// 修改指定答案
pub async fn update(
    State(state): State<ServerState>,
    Path((id, answer_id)): Path<(u64, u64)>,
    Json(input): Json<Answer>,
) -> Result<Json<Answer>, JsonApiError> {
    state.qa_store.update_answer(id, answer_id, input).await
        .map(|a| { info!(question_id = a.question_id, answer_id = a.id, "updated answer"); Json(a) })
        .map_err(map_store_error)
}
