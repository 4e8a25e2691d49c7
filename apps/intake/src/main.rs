mod application;
mod config;
mod errors;
mod render;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake v{}", env!("CARGO_PKG_VERSION"));
    info!(
        upload_dir = %config.upload_dir.display(),
        pdf_dir = %config.pdf_dir.display(),
        public_dir = %config.public_dir.display(),
        "Storage layout"
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let app = build_router(AppState::new(config)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://localhost:{}/", addr.port());

    axum::serve(listener, app).await?;

    Ok(())
}
