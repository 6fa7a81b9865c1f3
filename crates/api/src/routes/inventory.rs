//! Inventory transaction endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{InventoryTransaction, RecordInventoryTransaction};

use super::{RecordResponse, parse_record_id};
use crate::error::ApiError;
use crate::state::AppState;

type TransactionResponse = RecordResponse<InventoryTransaction>;

/// POST /inventory-transactions: record a movement of cargo.
#[tracing::instrument(skip(state, cmd))]
pub async fn record(
    State(state): State<Arc<AppState>>,
    Json(cmd): Json<RecordInventoryTransaction>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let stored = state
        .inventory
        .record(cmd)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// GET /inventory-transactions/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let id = parse_record_id(&id)?;
    let stored = state
        .inventory
        .get(id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(stored.into()))
}

/// GET /inventory-transactions
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let transactions = state
        .inventory
        .list()
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}
