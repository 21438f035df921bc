use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the active similarity backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillplan-api",
        "similarity_backend": state.oracle.backend(),
        "similarity_threshold": state.config.similarity_threshold,
        "exact_solver": state.analysis.solver.exact_enabled
    }))
}
