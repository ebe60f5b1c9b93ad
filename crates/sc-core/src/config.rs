use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, ScError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub oracle: OracleConfig,
    pub shortener: ShortenerConfig,
    pub ledger: LedgerConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub model: String,
    /// Generation budget is `max_chars / tokens_per_char_divisor + budget_offset`.
    pub tokens_per_char_divisor: u32,
    pub budget_offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub stats_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub cost_per_fragment: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 5000 }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            tokens_per_char_divisor: 4,
            budget_offset: 16,
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://tinyurl.com/api-create.php".into(),
            timeout_ms: 5_000,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { stats_path: PathBuf::from("stats.json") }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        // 2.25p per fragment
        Self { cost_per_fragment: 0.0225 }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("SC_HOST") {
            cfg.server.host = v;
        }
        if let Some(v) = lookup("SC_PORT") {
            cfg.server.port = parse("SC_PORT", &v)?;
        }
        if let Some(v) = lookup("OPENAI_API_KEY") {
            cfg.oracle.api_key = v;
        }
        if let Some(v) = lookup("OPENAI_BASE_URL") {
            cfg.oracle.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("SC_MODEL") {
            cfg.oracle.model = v;
        }
        if let Some(v) = lookup("SC_SHORTENER_ENDPOINT") {
            cfg.shortener.endpoint = v;
        }
        if let Some(v) = lookup("SC_SHORTENER_TIMEOUT_MS") {
            cfg.shortener.timeout_ms = parse("SC_SHORTENER_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SC_STATS_FILE") {
            cfg.ledger.stats_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SC_COST_PER_FRAGMENT") {
            cfg.pricing.cost_per_fragment = parse("SC_COST_PER_FRAGMENT", &v)?;
        }

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ScError::Config(format!("invalid value for {key}: {value:?}")))
}
