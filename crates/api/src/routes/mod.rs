pub mod breakers;
pub mod health;
pub mod inventory;
pub mod manifests;
pub mod metrics;

use chrono::{DateTime, Utc};
use common::RecordId;
use record_store::{Stored, Version};
use serde::Serialize;

use crate::error::ApiError;

/// A stored record with its version metadata alongside its own fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse<R> {
    #[serde(flatten)]
    pub record: R,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<R> From<Stored<R>> for RecordResponse<R> {
    fn from(stored: Stored<R>) -> Self {
        Self {
            record: stored.record,
            version: stored.version,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

fn parse_record_id(id: &str) -> Result<RecordId, ApiError> {
    uuid::Uuid::parse_str(id)
        .map(RecordId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid id '{id}': {e}")))
}
