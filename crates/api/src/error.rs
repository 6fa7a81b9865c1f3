//! API error types with HTTP response mapping.

use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::EntityKind;
use integrity::{FieldError, ServiceError};
use record_store::StoreError;
use resilience::{ConfigError, LookupError};
use thiserror::Error;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Breaker(#[from] ConfigError),

    #[error("No dependency configured for {0} references")]
    MissingDependency(EntityKind),

    #[error("Cannot build lookup for {dependency}: {source}")]
    Lookup {
        dependency: String,
        source: LookupError,
    },
}

/// API-level error type that maps to HTTP responses.
///
/// | error                                   | status |
/// |-----------------------------------------|--------|
/// | malformed request, invariant violation  | 400    |
/// | referenced entity or local record absent| 404    |
/// | stale version, duplicate record         | 409    |
/// | dependency unavailable                  | 503    |
/// | anything else                           | 500    |
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Service-layer failure.
    Service(ServiceError),
    /// A dependency could not be reached; clients may retry after the delay.
    Unavailable {
        error: ServiceError,
        retry_after: Duration,
    },
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field_errors, retry_after) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            ApiError::Unavailable { error, retry_after } => {
                tracing::warn!(error = %error, "dependency unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    error.to_string(),
                    None,
                    Some(retry_after),
                )
            }
            ApiError::Service(err) => {
                let (status, field_errors) = service_error_status(&err);
                if status.is_server_error() {
                    tracing::error!(error = %err, "service error");
                }
                (status, err.to_string(), field_errors, None)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None, None)
            }
        };

        metrics::counter!("api_errors_total", "status" => status.as_str().to_string()).increment(1);

        let body = match field_errors {
            Some(errors) => serde_json::json!({ "error": message, "fieldErrors": errors }),
            None => serde_json::json!({ "error": message }),
        };
        let mut response = (status, axum::Json(body)).into_response();

        if let Some(delay) = retry_after {
            let seconds = delay.as_secs() + u64::from(delay.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds.max(1)));
        }
        response
    }
}

fn service_error_status(err: &ServiceError) -> (StatusCode, Option<Vec<FieldError>>) {
    match err {
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, None),
        ServiceError::ReferencesNotFound(errors) => (StatusCode::NOT_FOUND, Some(errors.clone())),
        ServiceError::RecordNotFound { .. } => (StatusCode::NOT_FOUND, None),
        ServiceError::DependencyUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, None),
        ServiceError::Store(StoreError::ConcurrencyConflict { .. })
        | ServiceError::Store(StoreError::AlreadyExists { .. }) => (StatusCode::CONFLICT, None),
        ServiceError::Store(StoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, None),
        ServiceError::Store(StoreError::Backend(_)) | ServiceError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, None)
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
