pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::application::handlers;
use crate::state::AppState;

/// Builds the full router. Paths without a route fall through to the public directory.
pub fn build_router(state: AppState) -> Router {
    let public = ServeDir::new(&state.config.public_dir);
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/submit-application",
            post(handlers::handle_submit_application),
        )
        .fallback_service(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
