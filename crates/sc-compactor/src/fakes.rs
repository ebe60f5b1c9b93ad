//! In-process stand-ins for the external oracles.

use async_trait::async_trait;
use sc_core::{OracleError, ShortenerError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::stage1_links::UrlShortener;
use crate::stage3_oracle::{CompactionOracle, OracleRequest};

/// Maps each URL to `{prefix}{n}` in call order, counting calls.
pub struct FakeShortener {
    prefix: String,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeShortener {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), fail: false, calls: Mutex::new(Vec::new()) }
    }

    /// Every call fails with a transport error.
    pub fn failing() -> Self {
        Self { prefix: String::new(), fail: true, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UrlShortener for FakeShortener {
    async fn shorten(&self, url: &str) -> Result<String, ShortenerError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len()
        };
        if self.fail {
            return Err(ShortenerError::Transport("shortener unreachable".into()));
        }
        Ok(format!("{}{}", self.prefix, n))
    }
}

/// Behaviour of [`FakeOracle`].
pub enum FakeReply {
    /// Return this text.
    Text(String),
    /// Return the user message unchanged.
    Echo,
    /// Fail with a transport error carrying this message.
    Fail(String),
}

pub struct FakeOracle {
    reply: FakeReply,
    calls: AtomicUsize,
    last: Mutex<Option<OracleRequest>>,
}

impl FakeOracle {
    pub fn new(reply: FakeReply) -> Self {
        Self { reply, calls: AtomicUsize::new(0), last: Mutex::new(None) }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(FakeReply::Text(text.into()))
    }

    pub fn echo() -> Self {
        Self::new(FakeReply::Echo)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(FakeReply::Fail(message.into()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OracleRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompactionOracle for FakeOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        match &self.reply {
            FakeReply::Text(t) => Ok(t.clone()),
            FakeReply::Echo => Ok(request.message.clone()),
            FakeReply::Fail(msg) => Err(OracleError::Transport(msg.clone())),
        }
    }
}
