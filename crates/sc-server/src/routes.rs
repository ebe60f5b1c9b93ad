use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sc_compactor::UrlShortener;
use sc_core::{CompactionRequest, CompactionResult, UsageStats};
use serde_json::{json, Value};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Probe used by the shortener dependency check.
const PROBE_URL: &str = "https://example.com";

pub fn compaction_routes() -> Router<AppState> {
    Router::new().route("/shorten", post(shorten_message))
}

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/shortener", get(shortener_health))
}

async fn shorten_message(
    State(state): State<AppState>,
    payload: Result<Json<CompactionRequest>, JsonRejection>,
) -> Result<Json<CompactionResult>, ApiError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let span = info_span!("shorten", %request_id, max_chars = request.max_chars);
    async move {
        match state.pipeline.run(&request).await {
            Ok(result) => Ok(Json(result)),
            Err(e) => {
                warn!(error = %e, "compaction failed");
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}

async fn get_stats(State(state): State<AppState>) -> Json<UsageStats> {
    Json(state.ledger().snapshot().await)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn shortener_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.pipeline.shortener().shorten(PROBE_URL).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": e.to_string() })),
        ),
    }
}
