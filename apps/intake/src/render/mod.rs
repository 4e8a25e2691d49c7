//! Document Renderer: turns an `ApplicationRecord` into `<first_name>_application.pdf`.
//!
//! Layout and serialization are CPU-bound and run inside `tokio::task::spawn_blocking`;
//! only the directory creation and the final file write happen on the async runtime.

pub mod font_metrics;
pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tracing::info;

use crate::application::record::ApplicationRecord;
use crate::render::font_metrics::HELVETICA;
use crate::render::layout::{compose_application, PageGeometry, TITLE};
use crate::render::pdf::{encode_document, DocumentInfo};
use crate::storage::ensure_dir;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("render worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Renders `record` into `pdf_dir`, creating the directory if needed, and returns the
/// written path. An existing document for the same first name is overwritten.
pub async fn render_application(
    record: &ApplicationRecord,
    pdf_dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, RenderError> {
    ensure_dir(pdf_dir).await?;
    let path = pdf_dir.join(pdf_file_name(&record.first_name));

    let owned = record.clone();
    let bytes = tokio::task::spawn_blocking(move || build_pdf(&owned, generated_at)).await??;

    tokio::fs::write(&path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "PDF generated and saved");

    Ok(path)
}

/// Builds the PDF bytes for `record` without touching the filesystem.
pub fn build_pdf(record: &ApplicationRecord, generated_at: DateTime<Utc>) -> Result<Vec<u8>, RenderError> {
    let geometry = PageGeometry::LETTER;
    let pages = compose_application(record, &iso_timestamp(&generated_at), geometry, &HELVETICA);

    let info = DocumentInfo {
        title: TITLE.to_string(),
        producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        created_at: generated_at,
    };
    encode_document(&pages, geometry, &HELVETICA, &info)
}

/// `<first_name>_application.pdf`. Path separators in the name become `_` so the
/// document always lands directly inside the PDF directory.
pub fn pdf_file_name(first_name: &str) -> String {
    let safe: String = first_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("{safe}_application.pdf")
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
