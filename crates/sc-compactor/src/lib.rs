//! SMS compactor — four-stage message compaction pipeline.
//!
//! Stages:
//! 1. Links — extract, dedup and shorten URLs (one oracle call per unique link)
//! 2. Directives — compose the ordered instruction block for the oracle
//! 3. Oracle — hand text + instructions to the compaction oracle
//! 4. Normalize — hard length cap, fragment and cost accounting
//!
//! The pipeline then records the savings in the usage ledger.

#[cfg(any(test, feature = "test-util"))]
pub mod fakes;
pub mod pipeline;
pub mod stage1_links;
pub mod stage2_directives;
pub mod stage3_oracle;
pub mod stage4_normalize;

pub use pipeline::{CompactionPipeline, PipelineSettings};
pub use stage1_links::{shorten_urls, TinyUrlShortener, UrlCache, UrlShortener};
pub use stage2_directives::{compose_directives, CompactionDirectives, Directive, DirectiveBuilder, DirectiveKind};
pub use stage3_oracle::{compact, CompactionOracle, GenerationBudget, OpenAiOracle, OracleRequest};
pub use stage4_normalize::{normalize, sms_fragments, NormalizedOutput};
