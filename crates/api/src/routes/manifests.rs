//! Cargo manifest endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{CargoManifest, CreateCargoManifest, UpdateCargoManifest};
use record_store::Version;
use serde::Deserialize;

use super::{RecordResponse, parse_record_id};
use crate::error::ApiError;
use crate::state::AppState;

type ManifestResponse = RecordResponse<CargoManifest>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    /// Version the client last read; the update is rejected if it is stale.
    pub expected_version: Option<i64>,
}

/// POST /cargo-manifests: declare a manifest.
#[tracing::instrument(skip(state, cmd))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(cmd): Json<CreateCargoManifest>,
) -> Result<(StatusCode, Json<ManifestResponse>), ApiError> {
    let stored = state
        .manifests
        .create(cmd)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// PUT /cargo-manifests/{id}: apply the fields present in the body.
#[tracing::instrument(skip(state, cmd))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<UpdateParams>,
    Json(cmd): Json<UpdateCargoManifest>,
) -> Result<Json<ManifestResponse>, ApiError> {
    let id = parse_record_id(&id)?;
    let stored = state
        .manifests
        .update(id, cmd, params.expected_version.map(Version::new))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(stored.into()))
}

/// GET /cargo-manifests/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ManifestResponse>, ApiError> {
    let id = parse_record_id(&id)?;
    let stored = state
        .manifests
        .get(id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(stored.into()))
}

/// GET /cargo-manifests
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ManifestResponse>>, ApiError> {
    let manifests = state
        .manifests
        .list()
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(manifests.into_iter().map(Into::into).collect()))
}
