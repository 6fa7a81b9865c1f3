//! Circuit breaker introspection endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use resilience::BreakerSnapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /circuit-breakers: every breaker created so far.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<BreakerSnapshot>> {
    Json(state.breakers.snapshots())
}

/// GET /circuit-breakers/{name}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<BreakerSnapshot>, ApiError> {
    state
        .breakers
        .state(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Circuit breaker {name} not found")))
}

/// POST /circuit-breakers/{name}/reset: force a breaker back to CLOSED.
#[tracing::instrument(skip(state))]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.breakers.reset(&name) {
        tracing::info!(dependency = %name, "circuit breaker reset");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Circuit breaker {name} not found")))
    }
}
