//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: returns process liveness.
///
/// Dependency health is reported by `/circuit-breakers`, not here; a remote
/// outage must not mark this process as down.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
