use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::application::upload::UploadError;
use crate::render::RenderError;

/// Message returned to the client for every failed submission.
pub const FAILURE_MESSAGE: &str = "Error processing application";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The client never learns which stage failed: every variant maps to the same
/// 500 body, and the cause is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Upload(e) => tracing::error!("Upload error: {e}"),
            AppError::Render(e) => tracing::error!("Render error: {e}"),
        }

        let body = Json(json!({ "message": FAILURE_MESSAGE }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
