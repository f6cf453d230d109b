use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use crate::errors::FinderError;
use super::activity::{ActivityEntry, ActivitySink};

/// Append-only activity log file.
pub struct FileActivityLog {
    path: PathBuf,
}

impl FileActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivitySink for FileActivityLog {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), FinderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.render().as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
