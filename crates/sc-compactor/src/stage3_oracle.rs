//! Stage 3: Oracle — send instructions and text to the compaction oracle.

use async_trait::async_trait;
use reqwest::Client;
use sc_core::config::OracleConfig;
use sc_core::OracleError;
use serde::{Deserialize, Serialize};

use crate::stage2_directives::CompactionDirectives;

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleRequest {
    pub instructions: String,
    pub message: String,
    pub max_tokens: u32,
}

/// External text-compaction service.
#[async_trait]
pub trait CompactionOracle: Send + Sync {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError>;
}

/// Token budget derived from the character limit. The oracle does not honour
/// character limits exactly; stage 4 enforces the cap. A zero divisor acts as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationBudget {
    pub tokens_per_char_divisor: u32,
    pub offset: u32,
}

impl GenerationBudget {
    pub fn from_config(cfg: &OracleConfig) -> Self {
        Self {
            tokens_per_char_divisor: cfg.tokens_per_char_divisor,
            offset: cfg.budget_offset,
        }
    }

    pub fn tokens_for(&self, max_chars: usize) -> u32 {
        let scaled = max_chars / self.tokens_per_char_divisor.max(1) as usize;
        u32::try_from(scaled).unwrap_or(u32::MAX).saturating_add(self.offset)
    }
}

impl Default for GenerationBudget {
    fn default() -> Self {
        Self { tokens_per_char_divisor: 4, offset: 16 }
    }
}

/// Run one compaction. Blank output is an error.
pub async fn compact(
    oracle: &dyn CompactionOracle,
    processed_text: &str,
    directives: &CompactionDirectives,
    max_chars: usize,
    budget: GenerationBudget,
) -> Result<String, OracleError> {
    let request = OracleRequest {
        instructions: directives.render(),
        message: processed_text.to_string(),
        max_tokens: budget.tokens_for(max_chars),
    };
    let candidate = oracle.complete(&request).await?;
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    Ok(candidate.to_string())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiOracle {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn from_config(cfg: &OracleConfig) -> Self {
        Self::new(cfg.base_url.clone(), cfg.api_key.clone(), cfg.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompactionOracle for OpenAiOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.instructions },
                ChatMessage { role: "user", content: &request.message },
            ],
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(OracleError::EmptyResponse)
    }
}
