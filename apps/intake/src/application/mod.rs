//! Application intake: multipart upload, record assembly, and the submit handler.

pub mod handlers;
pub mod record;
pub mod upload;
