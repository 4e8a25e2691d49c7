use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every option has a default; only malformed numeric values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory receiving uploaded attachments, stored under their original names.
    pub upload_dir: PathBuf,
    /// Directory receiving the generated `<first_name>_application.pdf` files.
    pub pdf_dir: PathBuf,
    /// Static assets served for any path the router does not handle.
    pub public_dir: PathBuf,
    pub max_body_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            port: match lookup("PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => DEFAULT_PORT,
            },
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            pdf_dir: lookup("PDF_DIR").unwrap_or_else(|| "pdfs".to_string()).into(),
            public_dir: lookup("PUBLIC_DIR")
                .unwrap_or_else(|| "public".to_string())
                .into(),
            max_body_bytes: match lookup("MAX_BODY_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .with_context(|| format!("MAX_BODY_BYTES must be a byte count, got '{raw}'"))?,
                None => DEFAULT_MAX_BODY_BYTES,
            },
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
