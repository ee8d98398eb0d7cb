//! Writing downloaded bodies into the per-subreddit media folders.

use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::fs::naming::{sanitize_filename, sanitize_path_component};
use crate::fs::paths::{destination_dir, ensure_dir, subreddit_folder};

/// Writes files under `root/subreddit/{images|videos|gifs}`.
#[derive(Debug, Clone)]
pub struct DiskWriter {
    root: PathBuf,
    subreddit: String,
}

impl DiskWriter {
    /// Create a writer for one subreddit below `root`.
    pub fn new(root: impl Into<PathBuf>, subreddit: &str) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            subreddit: sanitize_path_component(subreddit)?,
        })
    }

    pub fn subreddit_dir(&self) -> PathBuf {
        subreddit_folder(&self.root, &self.subreddit)
    }

    pub fn destination_dir(&self, file_name: &str) -> PathBuf {
        destination_dir(&self.root, &self.subreddit, file_name)
    }

    /// Create `root/subreddit` up front so a bad root fails before any
    /// search request is made.
    pub async fn ensure_root(&self) -> Result<()> {
        ensure_dir(&self.subreddit_dir()).await
    }

    /// Write `bytes` to the media folder for `file_name`, replacing any
    /// existing file.
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = sanitize_filename(file_name)?;
        let dir = self.destination_dir(&file_name);
        ensure_dir(&dir).await?;

        let path = dir.join(&file_name);
        let mut file = File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
