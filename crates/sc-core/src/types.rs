use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScError};

pub const DEFAULT_MAX_CHARS: usize = 160;
pub const DEFAULT_SECTOR: &str = "General";
pub const DEFAULT_LANGUAGE: &str = "English";

/// Inbound compaction request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompactionRequest {
    /// Missing text deserializes as empty and is rejected by [`Self::validate`].
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_true")]
    pub shorten_urls: bool,
    #[serde(default = "default_sector")]
    pub business_sector: String,
    #[serde(default = "default_true")]
    pub protect_variables: bool,
    #[serde(default = "default_language")]
    pub target_language: String,
}

fn default_max_chars() -> usize { DEFAULT_MAX_CHARS }
fn default_true() -> bool { true }
fn default_sector() -> String { DEFAULT_SECTOR.into() }
fn default_language() -> String { DEFAULT_LANGUAGE.into() }

impl CompactionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_chars: DEFAULT_MAX_CHARS,
            shorten_urls: true,
            business_sector: DEFAULT_SECTOR.into(),
            protect_variables: true,
            target_language: DEFAULT_LANGUAGE.into(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_shorten_urls(mut self, on: bool) -> Self {
        self.shorten_urls = on;
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.business_sector = sector.into();
        self
    }

    pub fn with_protect_variables(mut self, on: bool) -> Self {
        self.protect_variables = on;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    /// Reject requests that must not reach any external collaborator.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(ScError::no_text());
        }
        if self.max_chars == 0 {
            return Err(ScError::Validation("max_chars must be a positive integer".into()));
        }
        Ok(())
    }

    /// Whether the output stays in English (no translation step).
    pub fn is_english(&self) -> bool {
        is_english(&self.target_language)
    }
}

pub fn is_english(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case(DEFAULT_LANGUAGE)
}

/// Outbound result of one compaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompactionResult {
    /// Input text after link substitution.
    pub original_text: String,
    pub shortened_text: String,
    pub original_length: usize,
    pub shortened_length: usize,
    pub sms_fragments: usize,
    pub original_sms_count: usize,
    pub new_sms_count: usize,
    pub characters_saved: usize,
    pub cost_savings: f64,
}

/// Aggregate counters persisted by the usage ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageStats {
    #[serde(default, alias = "total_sms_shortened", deserialize_with = "non_negative_count")]
    pub total_requests: u64,
    #[serde(default, deserialize_with = "non_negative_count")]
    pub total_characters_saved: u64,
    #[serde(default, deserialize_with = "non_negative_amount")]
    pub total_cost_saved: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Older stats files stored unclamped deltas, so totals may be negative.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredNumber {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

fn non_negative_count<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    Ok(match StoredNumber::deserialize(d)? {
        StoredNumber::Unsigned(v) => v,
        StoredNumber::Signed(v) => v.max(0) as u64,
        StoredNumber::Float(v) => v.max(0.0) as u64,
    })
}

fn non_negative_amount<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(f64::deserialize(d)?.max(0.0))
}
