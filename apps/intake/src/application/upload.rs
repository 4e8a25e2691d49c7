//! Upload Receiver: turns a multipart (or url-encoded) submission into text fields
//! plus at most one attachment persisted under the upload directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::async_trait;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::storage::ensure_dir;

/// Multipart field name carrying the optional attachment.
pub const UPLOAD_FIELD: &str = "upload";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("unexpected file field '{0}'")]
    UnexpectedField(String),

    #[error("more than one file in field '{UPLOAD_FIELD}'")]
    TooManyFiles,

    #[error("unreadable form body: {0}")]
    Unreadable(String),

    #[error("upload I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata of an attachment written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Name the file was stored under (final component of the client-supplied name).
    pub original_name: String,
    pub path: PathBuf,
}

/// Everything extracted from one multipart submission.
#[derive(Debug, Default)]
pub struct Submission {
    /// Text fields by name. A repeated name keeps the last value.
    pub fields: HashMap<String, String>,
    pub file: Option<StoredUpload>,
}

impl Submission {
    /// A submission made of text fields only.
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        Submission { fields, file: None }
    }

    /// Returns the named text field, or an empty string when it was not sent.
    pub fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

/// Body of a submission: multipart (possibly with a file) or a plain url-encoded form.
pub enum SubmissionBody {
    Multipart(Multipart),
    UrlEncoded(HashMap<String, String>),
}

#[async_trait]
impl<S> FromRequest<S> for SubmissionBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let url_encoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if url_encoded {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| UploadError::Unreadable(rejection.body_text()))?;
            return Ok(SubmissionBody::UrlEncoded(fields));
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| UploadError::Unreadable(rejection.body_text()))?;
        Ok(SubmissionBody::Multipart(multipart))
    }
}

/// Turns either body kind into a `Submission`. Only multipart bodies can carry a file.
pub async fn receive_body(body: SubmissionBody, upload_dir: &Path) -> Result<Submission, UploadError> {
    match body {
        SubmissionBody::Multipart(multipart) => receive(multipart, upload_dir).await,
        SubmissionBody::UrlEncoded(fields) => {
            debug!(fields = fields.len(), "url-encoded form received");
            Ok(Submission::from_fields(fields))
        }
    }
}

/// Drains the multipart stream, writing the `upload` file part (if any) into `upload_dir`.
///
/// The directory is only created when a file actually arrives. An existing file with the
/// same name is overwritten. If the body fails at any point, a file already written for
/// this request is removed again.
pub async fn receive(multipart: Multipart, upload_dir: &Path) -> Result<Submission, UploadError> {
    let mut submission = Submission::default();

    match read_parts(multipart, upload_dir, &mut submission).await {
        Ok(()) => Ok(submission),
        Err(err) => {
            if let Some(file) = &submission.file {
                discard(&file.path).await;
            }
            Err(err)
        }
    }
}

async fn read_parts(
    mut multipart: Multipart,
    upload_dir: &Path,
    submission: &mut Submission,
) -> Result<(), UploadError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let file_name = match field.file_name().map(str::to_owned) {
            Some(file_name) => stored_file_name(&file_name),
            None => {
                let value = field.text().await?;
                debug!(field = %name, "text field received");
                submission.fields.insert(name, value);
                continue;
            }
        };

        // Browsers send an empty file part when no file was chosen.
        let Some(file_name) = file_name else {
            drain(field).await?;
            continue;
        };

        if name != UPLOAD_FIELD {
            return Err(UploadError::UnexpectedField(name));
        }
        if submission.file.is_some() {
            return Err(UploadError::TooManyFiles);
        }

        ensure_dir(upload_dir).await?;
        let path = upload_dir.join(&file_name);
        let bytes = persist(field, &path).await?;
        info!(file = %file_name, path = %path.display(), bytes, "upload stored");

        submission.file = Some(StoredUpload {
            original_name: file_name,
            path,
        });
    }

    Ok(())
}

/// Reduces a client-supplied file name to its final path component.
///
/// Both `/` and `\` count as separators since browsers on Windows may send full paths.
/// Returns `None` when nothing usable remains.
fn stored_file_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    match last {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Streams `field` into `path`. A partially written file is removed on failure.
async fn persist(field: Field<'_>, path: &Path) -> Result<u64, UploadError> {
    let result = write_chunks(field, path).await;
    if result.is_err() {
        discard(path).await;
    }
    result
}

async fn write_chunks(mut field: Field<'_>, path: &Path) -> Result<u64, UploadError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "incomplete upload removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "failed to remove incomplete upload: {e}"),
    }
}

async fn drain(mut field: Field<'_>) -> Result<(), UploadError> {
    while field.chunk().await?.is_some() {}
    Ok(())
}
