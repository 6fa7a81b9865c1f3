//! HTTP ingress for the cross-service integrity core.
//!
//! Exposes inventory transactions and cargo manifests, whose foreign
//! references are confirmed against their owning services before anything
//! is stored, plus circuit breaker introspection, structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{ApiError, StartupError};
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/inventory-transactions",
            post(routes::inventory::record).get(routes::inventory::list),
        )
        .route("/inventory-transactions/{id}", get(routes::inventory::get))
        .route(
            "/cargo-manifests",
            post(routes::manifests::create).get(routes::manifests::list),
        )
        .route(
            "/cargo-manifests/{id}",
            get(routes::manifests::get).put(routes::manifests::update),
        )
        .route("/circuit-breakers", get(routes::breakers::list))
        .route("/circuit-breakers/{name}", get(routes::breakers::get))
        .route(
            "/circuit-breakers/{name}/reset",
            post(routes::breakers::reset),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state described by `config`.
pub fn create_state(config: &Config) -> Result<Arc<AppState>, StartupError> {
    AppState::from_config(config).map(Arc::new)
}
