//! Usage ledger — aggregate counters for every successful compaction.
//!
//! All mutations go through one async mutex, and each one rewrites the
//! whole stats file via a temp-file rename, so concurrent requests never
//! lose updates and a crash never leaves a half-written file.

pub mod store;

use chrono::Utc;
use sc_core::{Result, UsageStats};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use store::StatsFile;

pub struct UsageLedger {
    stats: Mutex<UsageStats>,
    file: Option<StatsFile>,
}

impl UsageLedger {
    /// Open the ledger at `path`, creating a zeroed file if none exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = StatsFile::new(path.as_ref());
        let stats = match file.load().await? {
            Some(stats) => stats,
            None => {
                let stats = UsageStats::default();
                file.store(&stats).await?;
                stats
            }
        };
        debug!(path = %file.path().display(), requests = stats.total_requests, "ledger opened");
        Ok(Self { stats: Mutex::new(stats), file: Some(file) })
    }

    /// Ledger that never touches disk.
    pub fn in_memory() -> Self {
        Self { stats: Mutex::new(UsageStats::default()), file: None }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.file.as_ref().map(|f| f.path().to_path_buf())
    }

    /// Count one request with its savings. Either the whole update lands
    /// (memory and disk) or nothing changes.
    pub async fn record(&self, characters_saved: u64, cost_saved: f64) -> Result<UsageStats> {
        let mut guard = self.stats.lock().await;
        let mut next = guard.clone();
        next.total_requests += 1;
        next.total_characters_saved += characters_saved;
        next.total_cost_saved += cost_saved.max(0.0);
        next.last_updated = Some(Utc::now());

        if let Some(file) = &self.file {
            if let Err(e) = file.store(&next).await {
                warn!(error = %e, "failed to persist usage stats");
                return Err(e);
            }
        }
        *guard = next.clone();
        Ok(next)
    }

    pub async fn snapshot(&self) -> UsageStats {
        self.stats.lock().await.clone()
    }
}
