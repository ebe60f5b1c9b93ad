//! Stage 1: Links — extract URLs, shorten each distinct one once, substitute.

use async_trait::async_trait;
use regex::{Captures, Regex};
use reqwest::Client;
use sc_core::config::ShortenerConfig;
use sc_core::ShortenerError;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Sentence punctuation that may trail a link without belonging to it.
pub const TRAILING_PUNCT: &[char] = &['.', ',', ';', '!', '?'];

/// External link-shortening service.
#[async_trait]
pub trait UrlShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<String, ShortenerError>;
}

/// All URL tokens in `text`, in order of appearance, duplicates included.
pub fn extract_urls(text: &str) -> Vec<&str> {
    RE_URL.find_iter(text).map(|m| m.as_str()).collect()
}

/// Strip trailing sentence punctuation from a matched URL token.
pub fn normalize_url(url: &str) -> &str {
    url.trim_end_matches(TRAILING_PUNCT)
}

/// Per-request map from normalized URL to its replacement.
#[derive(Debug, Default, Clone)]
pub struct UrlCache {
    entries: HashMap<String, String>,
}

impl UrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.entries.contains_key(normalized)
    }

    pub fn insert(&mut self, normalized: impl Into<String>, replacement: impl Into<String>) {
        self.entries.insert(normalized.into(), replacement.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shorten every distinct normalized URL in `text` that is not cached yet.
    /// Failures cache the original URL so it is not retried.
    pub async fn populate(&mut self, text: &str, shortener: &dyn UrlShortener) {
        for token in extract_urls(text) {
            let normalized = normalize_url(token);
            if self.contains(normalized) {
                debug!(url = normalized, "link cache hit");
                continue;
            }
            let replacement = match shortener.shorten(normalized).await {
                Ok(short) => {
                    debug!(url = normalized, short = %short, "link shortened");
                    short
                }
                Err(e) => {
                    warn!(url = normalized, error = %e, "link shortening failed, keeping original");
                    normalized.to_string()
                }
            };
            self.insert(normalized, replacement);
        }
    }

    /// Replace each URL token with its cached form, keeping stripped punctuation.
    pub fn substitute(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        RE_URL
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                let normalized = normalize_url(token);
                let suffix = &token[normalized.len()..];
                let short = self.get(normalized).unwrap_or(normalized);
                format!("{short}{suffix}")
            })
            .into_owned()
    }
}

/// Shorten all links in `text` with a fresh per-request cache.
pub async fn shorten_urls(text: &str, shortener: &dyn UrlShortener) -> String {
    let mut cache = UrlCache::new();
    cache.populate(text, shortener).await;
    cache.substitute(text)
}

/// TinyURL-style plain-text API: `GET {endpoint}?url=...` answers with the short link.
pub struct TinyUrlShortener {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl TinyUrlShortener {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into(), timeout }
    }

    pub fn from_config(cfg: &ShortenerConfig) -> Self {
        Self::new(cfg.endpoint.clone(), Duration::from_millis(cfg.timeout_ms))
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl UrlShortener for TinyUrlShortener {
    async fn shorten(&self, url: &str) -> Result<String, ShortenerError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ShortenerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShortenerError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ShortenerError::Transport(e.to_string()))?;
        let short = body.trim();
        if !short.starts_with("http") {
            return Err(ShortenerError::Malformed(short.chars().take(80).collect()));
        }
        Ok(short.to_string())
    }
}
