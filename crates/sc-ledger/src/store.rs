//! JSON stats file with atomic writes.

use sc_core::{Result, ScError, UsageStats};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    pub async fn load(&self) -> Result<Option<UsageStats>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, fsync, then rename over the target.
    pub async fn store(&self, stats: &UsageStats) -> Result<()> {
        let body = serde_json::to_vec_pretty(stats)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ledger_err)?;
            }
        }
        let tmp_path = self.path.with_extension("tmp");
        let result = async {
            let mut f = fs::File::create(&tmp_path).await?;
            f.write_all(&body).await?;
            f.flush().await?;
            f.sync_all().await?;
            fs::rename(&tmp_path, &self.path).await
        }
        .await;
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ledger_err(e));
        }
        Ok(())
    }
}

fn ledger_err(e: std::io::Error) -> ScError {
    ScError::Ledger(e.to_string())
}
