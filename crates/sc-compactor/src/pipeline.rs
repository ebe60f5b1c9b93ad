//! Compaction pipeline — chains the four stages and the usage ledger.

use sc_core::{CompactionRequest, CompactionResult, Result, ServiceConfig};
use sc_ledger::UsageLedger;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::stage1_links::{shorten_urls, UrlShortener};
use crate::stage2_directives::DirectiveBuilder;
use crate::stage3_oracle::{compact, CompactionOracle, GenerationBudget};
use crate::stage4_normalize::{self, char_len, cost_savings, normalize, round_currency, sms_fragments};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub budget: GenerationBudget,
    pub cost_per_fragment: f64,
}

impl PipelineSettings {
    pub fn from_config(cfg: &ServiceConfig) -> Self {
        Self {
            budget: GenerationBudget::from_config(&cfg.oracle),
            cost_per_fragment: cfg.pricing.cost_per_fragment,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { budget: GenerationBudget::default(), cost_per_fragment: 0.0225 }
    }
}

pub struct CompactionPipeline {
    shortener: Arc<dyn UrlShortener>,
    oracle: Arc<dyn CompactionOracle>,
    ledger: Arc<UsageLedger>,
    settings: PipelineSettings,
}

impl CompactionPipeline {
    pub fn new(
        shortener: Arc<dyn UrlShortener>,
        oracle: Arc<dyn CompactionOracle>,
        ledger: Arc<UsageLedger>,
    ) -> Self {
        Self { shortener, oracle, ledger, settings: PipelineSettings::default() }
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }

    pub fn shortener(&self) -> &Arc<dyn UrlShortener> {
        &self.shortener
    }

    /// Compact one message. The ledger is only touched when every stage succeeds.
    pub async fn run(&self, request: &CompactionRequest) -> Result<CompactionResult> {
        request.validate()?;

        let processed = if request.shorten_urls {
            shorten_urls(&request.text, self.shortener.as_ref()).await
        } else {
            request.text.clone()
        };

        let directives = DirectiveBuilder::new(request.max_chars)
            .sector(request.business_sector.as_str())
            .protect_variables(request.protect_variables)
            .target_language(request.target_language.as_str())
            .build();
        debug!(sections = ?directives.kinds(), "directives composed");

        let candidate = compact(
            self.oracle.as_ref(),
            &processed,
            &directives,
            request.max_chars,
            self.settings.budget,
        )
        .await?;

        let output = normalize(&candidate, request.max_chars, &request.target_language);
        if output.truncated {
            debug!(max_chars = request.max_chars, "oracle output cut to limit");
        }
        if request.protect_variables {
            let lost = stage4_normalize::lost_placeholders(&processed, &output.text);
            if !lost.is_empty() {
                warn!(?lost, "placeholders missing from compacted output");
            }
        }

        let original_length = char_len(&processed);
        let original_fragments = sms_fragments(&processed);
        let characters_saved = original_length.saturating_sub(output.length);
        let cost = cost_savings(original_fragments, output.fragments, self.settings.cost_per_fragment);

        self.ledger.record(characters_saved as u64, cost).await?;

        info!(
            original_length,
            shortened_length = output.length,
            original_fragments,
            fragments = output.fragments,
            "message compacted"
        );

        Ok(CompactionResult {
            original_text: processed,
            shortened_length: output.length,
            shortened_text: output.text,
            original_length,
            sms_fragments: output.fragments,
            original_sms_count: original_fragments,
            new_sms_count: output.fragments,
            characters_saved,
            cost_savings: round_currency(cost),
        })
    }
}
