//! Append-only record of chat messages that could not be posted.

use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// A plain-text file that gains one line per rejected chat post.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a timestamped entry for `content`, creating the file if needed.
    pub async fn record(&self, content: &str) -> io::Result<()> {
        let entry = format!(
            "Error posting at slack,time={},content={}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            content
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await
    }
}
