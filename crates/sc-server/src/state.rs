//! Application state shared across all handlers.

use sc_compactor::{CompactionPipeline, OpenAiOracle, PipelineSettings, TinyUrlShortener};
use sc_core::{Result, ServiceConfig};
use sc_ledger::UsageLedger;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CompactionPipeline>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(pipeline: CompactionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            start_time: std::time::Instant::now(),
        }
    }

    /// Wire the HTTP-backed oracles and the on-disk ledger from configuration.
    pub async fn from_config(cfg: &ServiceConfig) -> Result<Self> {
        let ledger = UsageLedger::open(&cfg.ledger.stats_path).await?;
        let pipeline = CompactionPipeline::new(
            Arc::new(TinyUrlShortener::from_config(&cfg.shortener)),
            Arc::new(OpenAiOracle::from_config(&cfg.oracle)),
            Arc::new(ledger),
        )
        .with_settings(PipelineSettings::from_config(cfg));
        Ok(Self::new(pipeline))
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        self.pipeline.ledger()
    }
}
