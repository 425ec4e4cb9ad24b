//! # Health Check Handlers
//!
//! Liveness endpoints for load balancers and monitoring.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "API is running" }))
}

/// GET /health
///
/// Always 200 while the process is up. Reports which external integrations
/// are configured so an operator can spot a degraded deployment:
///
/// ```json
/// { "status": "healthy", "service": "caredata-backend", "identity": "configured", "health_scan": "unconfigured" }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let describe = |configured: bool| if configured { "configured" } else { "unconfigured" };

    Json(json!({
        "status": "healthy",
        "service": "caredata-backend",
        "identity": describe(state.verifier.is_configured()),
        "health_scan": describe(state.extractor.is_configured()),
    }))
}
