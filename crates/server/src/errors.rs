use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// API error rendered as `{"error": title, "details": ...}` with a status.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    title: &'static str,
    detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = self.title, detail = ?self.detail, "request failed");
        }
        (
            self.status,
            Json(serde_json::json!({"error": self.title, "details": self.detail})),
        )
            .into_response()
    }
}
