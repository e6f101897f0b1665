//! The HTTP surface.

use axum::routing::{get, post};
use axum::Router;
use cosmogenesis_io::UniverseStore;
use std::sync::Arc;
use std::time::Duration;

/// HTTP status mapping for kernel and store errors
pub mod error;
/// Request handlers for every endpoint
pub mod handlers;

/// Shared state behind every handler.
pub struct AppState {
    pub store: UniverseStore,
    pub auth_secret: String,
    pub verbose_errors: bool,
    /// Simulation runs abort between ticks once this much time is spent.
    pub simulate_timeout: Duration,
}

impl AppState {
    pub fn new(store: UniverseStore, auth_secret: impl Into<String>, verbose_errors: bool) -> Self {
        Self {
            store,
            auth_secret: auth_secret.into(),
            verbose_errors,
            simulate_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/universe",
            get(handlers::list_universes).post(handlers::create_universe),
        )
        .route(
            "/universe/:id",
            get(handlers::get_universe).delete(handlers::delete_universe),
        )
        .route("/universe/:id/simulate", post(handlers::simulate))
        .route("/universe/:id/resolve-anomaly", post(handlers::resolve_anomaly))
        .route("/universe/:id/stats", get(handlers::stats))
        .route("/universe/:id/anomalies", get(handlers::anomalies))
        .route("/universe/:id/predictions", get(handlers::predictions))
        .route("/universe/:id/end-conditions", get(handlers::end_conditions))
        .route("/universe/:id/cleanup-anomalies", post(handlers::cleanup_anomalies))
        .with_state(state)
}
