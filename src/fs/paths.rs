//! Destination path layout.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::media::MediaKind;

/// Folder receiving every download for one subreddit: `root/subreddit`.
pub fn subreddit_folder(root: &Path, subreddit: &str) -> PathBuf {
    root.join(subreddit)
}

/// Media folder for a file name: `root/subreddit/{images|videos|gifs}`.
pub fn destination_dir(root: &Path, subreddit: &str, file_name: &str) -> PathBuf {
    subreddit_folder(root, subreddit).join(MediaKind::from_file_name(file_name).folder_name())
}

/// Create a directory and its parents. Safe to call concurrently for the
/// same path.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| Error::DownloadFolder {
            path: path.to_path_buf(),
            source,
        })
}
