use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version, whether a generator credential is present, and the tier models.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "lounge-api",
        "generator_configured": state.pipeline.is_configured(),
        "models": {
            "fast": state.config.fast_model,
            "robust": state.config.robust_model
        }
    }))
}
