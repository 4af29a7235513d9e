pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Document-carrying routes get the configured limit instead of axum's 2 MB default.
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume pipeline
        .route(
            "/api/v1/resumes/parse",
            post(handlers::handle_parse).layer(upload_limit.clone()),
        )
        .route(
            "/api/v1/resumes/parse/upload",
            post(handlers::handle_parse_upload).layer(upload_limit),
        )
        .route("/api/v1/resumes/analyze", post(handlers::handle_analyze))
        .route("/api/v1/resumes/match", post(handlers::handle_match))
        .with_state(state)
}
