use crate::*;
use crate::types::is_english;
use std::collections::HashMap;

// ========== Request ==========

#[test]
fn test_request_defaults_from_json() {
    let req: CompactionRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
    assert_eq!(req.max_chars, 160);
    assert!(req.shorten_urls);
    assert!(req.protect_variables);
    assert_eq!(req.business_sector, "General");
    assert_eq!(req.target_language, "English");
}

#[test]
fn test_request_missing_text_is_rejected() {
    let req: CompactionRequest = serde_json::from_str(r#"{"max_chars":10}"#).unwrap();
    assert_eq!(req.max_chars, 10);
    assert!(req.validate().unwrap_err().is_validation());
}

#[test]
fn test_validate_empty_text() {
    let err = CompactionRequest::new("").validate().unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "No text provided");
}

#[test]
fn test_validate_whitespace_text() {
    assert!(CompactionRequest::new("   \n").validate().is_err());
}

#[test]
fn test_validate_zero_budget() {
    let err = CompactionRequest::new("hi").with_max_chars(0).validate().unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_validate_ok() {
    assert!(CompactionRequest::new("hello").validate().is_ok());
}

#[test]
fn test_is_english() {
    assert!(is_english("English"));
    assert!(is_english(" english "));
    assert!(!is_english("French"));
    assert!(CompactionRequest::new("x").is_english());
    assert!(!CompactionRequest::new("x").with_language("Welsh").is_english());
}

// ========== Errors ==========

#[test]
fn test_oracle_error_message_is_verbatim() {
    let err: ScError = OracleError::Transport("connection refused".into()).into();
    assert_eq!(err.to_string(), "connection refused");
    assert!(!err.is_validation());
}

#[test]
fn test_empty_response_message() {
    assert_eq!(OracleError::EmptyResponse.to_string(), "Oracle returned an empty response");
}

// ========== Usage stats ==========

#[test]
fn test_usage_stats_reads_legacy_key() {
    let stats: UsageStats = serde_json::from_str(
        r#"{"total_sms_shortened":3,"total_characters_saved":40,"total_cost_saved":0.045}"#,
    ).unwrap();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.total_characters_saved, 40);
    assert!(stats.last_updated.is_none());
}

#[test]
fn test_usage_stats_clamps_negative_totals() {
    let stats: UsageStats = serde_json::from_str(
        r#"{"total_sms_shortened":2,"total_characters_saved":-7,"total_cost_saved":-0.5}"#,
    ).unwrap();
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.total_characters_saved, 0);
    assert_eq!(stats.total_cost_saved, 0.0);
}

#[test]
fn test_usage_stats_float_count() {
    let stats: UsageStats = serde_json::from_str(r#"{"total_characters_saved":12.0}"#).unwrap();
    assert_eq!(stats.total_characters_saved, 12);
}

#[test]
fn test_usage_stats_default_zero() {
    let stats = UsageStats::default();
    assert_eq!(stats.total_requests, 0);
    assert_eq!(stats.total_cost_saved, 0.0);
}

// ========== Config ==========

#[test]
fn test_config_defaults() {
    let cfg = ServiceConfig::default();
    assert_eq!(cfg.server.port, 5000);
    assert_eq!(cfg.oracle.model, "gpt-4o-mini");
    assert!((cfg.pricing.cost_per_fragment - 0.0225).abs() < 1e-12);
    assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
}

#[test]
fn test_config_overlay() {
    let env: HashMap<&str, &str> = [
        ("SC_PORT", "8081"),
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
        ("SC_STATS_FILE", "/tmp/s.json"),
        ("SC_COST_PER_FRAGMENT", "0.05"),
    ].into_iter().collect();
    let cfg = ServiceConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.oracle.api_key, "sk-test");
    assert_eq!(cfg.oracle.base_url, "http://localhost:9000/v1");
    assert_eq!(cfg.ledger.stats_path.to_str(), Some("/tmp/s.json"));
    assert!((cfg.pricing.cost_per_fragment - 0.05).abs() < 1e-12);
}

#[test]
fn test_config_bad_number() {
    let err = ServiceConfig::from_lookup(|k| (k == "SC_PORT").then(|| "eighty".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("SC_PORT"));
}

#[test]
fn test_config_api_key_not_serialized() {
    let mut cfg = ServiceConfig::default();
    cfg.oracle.api_key = "secret".into();
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(!json.contains("secret"));
}
