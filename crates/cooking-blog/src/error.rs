use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blog_common::error::CommonError;
use serde_json::json;
use tracing::error;

const FALLBACK_MESSAGE: &str = "Error Occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("malformed form data: {0}")]
    Multipart(#[from] MultipartError),
}

/// Every failure reaching a handler boundary becomes the same generic payload:
/// `500 {"message": ...}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");

        let mut message = self.to_string();
        if message.trim().is_empty() {
            message = FALLBACK_MESSAGE.to_string();
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": message })),
        )
            .into_response()
    }
}
