use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("Ledger error: {0}")]
    Ledger(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScError {
    pub fn no_text() -> Self {
        Self::Validation("No text provided".into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Failures of the text-compaction oracle. These abort the request.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("{0}")]
    Transport(String),
    #[error("Oracle returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed oracle response: {0}")]
    Parse(String),
    #[error("Oracle returned an empty response")]
    EmptyResponse,
}

/// Failures of the link-shortening oracle. Always recovered locally.
#[derive(Error, Debug)]
pub enum ShortenerError {
    #[error("{0}")]
    Transport(String),
    #[error("Shortener returned status {0}")]
    Status(u16),
    #[error("Malformed shortener response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ScError>;
