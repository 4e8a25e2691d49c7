use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::application::record::ApplicationRecord;
use crate::application::upload::{self, SubmissionBody};
use crate::errors::AppError;
use crate::render::render_application;
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str = "Application received successfully and PDF generated!";

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
}

/// POST /submit-application
///
/// Accepts `multipart/form-data` (with an optional `upload` attachment) or a plain
/// url-encoded form. Stores the attachment, renders the application PDF, and only then
/// answers. Any failure along the way becomes the generic 500 from `AppError`.
pub async fn handle_submit_application(
    State(state): State<AppState>,
    body: SubmissionBody,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission = upload::receive_body(body, &state.config.upload_dir).await?;
    let record = ApplicationRecord::from_submission(&submission);

    let pdf_path = render_application(&record, &state.config.pdf_dir, Utc::now()).await?;

    debug!(?record, "form data");
    info!(
        first_name = %record.first_name,
        pdf = %pdf_path.display(),
        has_upload = submission.file.is_some(),
        "application processed"
    );

    Ok(Json(SubmitResponse {
        message: SUCCESS_MESSAGE,
    }))
}
