pub mod config;
pub mod error;
pub mod types;

pub use config::ServiceConfig;
pub use error::{OracleError, Result, ScError, ShortenerError};
pub use types::{CompactionRequest, CompactionResult, UsageStats};

#[cfg(test)]
mod tests;
