//! SMS compactor HTTP API server (Axum).
//!
//! Provides the compaction endpoint, aggregate usage stats, and
//! liveness/dependency health checks.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;
use tower_http::cors::CorsLayer;

/// Build the application router with the given state.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::compaction_routes())
        .merge(routes::stats_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
