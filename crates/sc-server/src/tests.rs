use crate::*;
use crate::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sc_compactor::fakes::{FakeOracle, FakeShortener};
use sc_compactor::CompactionPipeline;
use sc_ledger::UsageLedger;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    state: AppState,
    shortener: Arc<FakeShortener>,
    oracle: Arc<FakeOracle>,
}

fn harness(shortener: FakeShortener, oracle: FakeOracle) -> Harness {
    let shortener = Arc::new(shortener);
    let oracle = Arc::new(oracle);
    let pipeline = CompactionPipeline::new(
        shortener.clone(),
        oracle.clone(),
        Arc::new(UsageLedger::in_memory()),
    );
    Harness { state: AppState::new(pipeline), shortener, oracle }
}

fn default_harness() -> Harness {
    harness(FakeShortener::new("https://tinyurl.com/t"), FakeOracle::echo())
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app_with_state(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let h = default_harness();
    let (status, body) = send(&h.state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_shortener_health_ok() {
    let h = default_harness();
    let (status, body) = send(&h.state, get("/health/shortener")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(h.shortener.call_count(), 1);
}

#[tokio::test]
async fn test_shortener_health_degraded() {
    let h = harness(FakeShortener::failing(), FakeOracle::echo());
    let (status, body) = send(&h.state, get("/health/shortener")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert!(body["error"].as_str().unwrap().contains("unreachable"));
}

// ========== Shorten ==========

#[tokio::test]
async fn test_shorten_success_shape() {
    let h = harness(FakeShortener::new("https://tinyurl.com/t"), FakeOracle::text("Appt confirmed [Date]"));
    let (status, body) = send(&h.state, post_json("/shorten", json!({
        "text": "Hello, this is to let you know your appointment is confirmed for [Date].",
        "max_chars": 160
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shortened_text"], "Appt confirmed [Date]");
    assert_eq!(body["shortened_length"], 21);
    assert_eq!(body["original_length"], 72);
    assert_eq!(body["sms_fragments"], 1);
    assert_eq!(body["new_sms_count"], 1);
    assert_eq!(body["characters_saved"], 51);
    assert_eq!(body["cost_savings"], 0.0);
}

#[tokio::test]
async fn test_shorten_missing_text() {
    let h = default_harness();
    let (status, body) = send(&h.state, post_json("/shorten", json!({ "max_chars": 100 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");
    assert_eq!(h.oracle.call_count(), 0);
    assert_eq!(h.state.ledger().snapshot().await.total_requests, 0);
}

#[tokio::test]
async fn test_shorten_empty_text() {
    let h = default_harness();
    let (status, body) = send(&h.state, post_json("/shorten", json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");
}

#[tokio::test]
async fn test_shorten_malformed_json() {
    let h = default_harness();
    let req = Request::builder()
        .method("POST")
        .uri("/shorten")
        .header("content-type", "application/json")
        .body(Body::from("{\"text\": "))
        .unwrap();
    let (status, body) = send(&h.state, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_shorten_oracle_failure_is_500() {
    let h = harness(FakeShortener::new("https://tinyurl.com/t"), FakeOracle::failing("invalid api key"));
    let (status, body) = send(&h.state, post_json("/shorten", json!({ "text": "Hello" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "invalid api key");
    assert_eq!(h.state.ledger().snapshot().await.total_requests, 0);
}

#[tokio::test]
async fn test_shorten_empty_oracle_reply_is_500() {
    let h = harness(FakeShortener::new("https://tinyurl.com/t"), FakeOracle::text(""));
    let (status, body) = send(&h.state, post_json("/shorten", json!({ "text": "Hello" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_shorten_dedups_links() {
    let h = default_harness();
    let (status, body) = send(&h.state, post_json("/shorten", json!({
        "text": "Check this out: https://example.com/a/very/long/path?x=1 and https://example.com/a/very/long/path?x=1."
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.shortener.call_count(), 1);
    assert_eq!(body["original_text"], "Check this out: https://tinyurl.com/t1 and https://tinyurl.com/t1.");
}

#[tokio::test]
async fn test_shorten_links_disabled() {
    let h = default_harness();
    let (status, body) = send(&h.state, post_json("/shorten", json!({
        "text": "See https://example.com/x",
        "shorten_urls": false
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.shortener.call_count(), 0);
    assert_eq!(body["original_text"], "See https://example.com/x");
}

#[tokio::test]
async fn test_shorten_passes_toggles_to_oracle() {
    let h = default_harness();
    let (status, _) = send(&h.state, post_json("/shorten", json!({
        "text": "Your order [OrderId] has shipped",
        "business_sector": "Retail",
        "protect_variables": false,
        "target_language": "Italian",
        "max_chars": 80
    }))).await;
    assert_eq!(status, StatusCode::OK);
    let req = h.oracle.last_request().unwrap();
    assert!(req.instructions.contains("Retail sector"));
    assert!(req.instructions.contains("translate the message into Italian"));
    assert!(!req.instructions.contains("square brackets"));
}

// ========== Stats ==========

#[tokio::test]
async fn test_stats_after_requests() {
    let h = harness(FakeShortener::new("https://tinyurl.com/t"), FakeOracle::text("ok"));
    for _ in 0..3 {
        let (status, _) = send(&h.state, post_json("/shorten", json!({ "text": "okay then" }))).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&h.state, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_requests"], 3);
    assert_eq!(body["total_characters_saved"], 21);
    assert_eq!(body["total_cost_saved"], 0.0);
}

#[tokio::test]
async fn test_stats_empty() {
    let h = default_harness();
    let (status, body) = send(&h.state, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_requests"], 0);
    assert!(body.get("last_updated").is_none());
}

#[tokio::test]
async fn test_state_from_config_opens_ledger() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cfg = sc_core::ServiceConfig::default();
    cfg.ledger.stats_path = dir.path().join("stats.json");
    let state = AppState::from_config(&cfg).await.unwrap();
    assert_eq!(state.ledger().path().as_deref(), Some(cfg.ledger.stats_path.as_path()));
    assert!(cfg.ledger.stats_path.exists());
}
