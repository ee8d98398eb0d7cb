//! Download outcomes and run statistics.

use std::path::PathBuf;

/// Why a target was skipped without being treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The server answered 404 or 403: the media was deleted.
    NotFound,
    /// Video downloads are not supported.
    VideoUnsupported,
    /// The url carries no recognized media extension.
    UnrecognizedExtension,
}

/// Terminal result of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { path: PathBuf },
    Skipped(SkipReason),
    /// Every allowed attempt failed.
    Failed { attempts: u32, reason: String },
}

/// A target that could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub name: String,
    pub url: String,
    pub attempts: u32,
    pub reason: String,
}

/// Per-outcome counts for one download batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: u64,
    pub not_found: u64,
    pub videos_skipped: u64,
    pub unrecognized: u64,
    pub failed: Vec<FailedDownload>,
}

impl DownloadReport {
    /// Record the terminal outcome of one target.
    pub fn record(&mut self, name: &str, url: &str, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success { .. } => self.downloaded += 1,
            DownloadOutcome::Skipped(SkipReason::NotFound) => self.not_found += 1,
            DownloadOutcome::Skipped(SkipReason::VideoUnsupported) => self.videos_skipped += 1,
            DownloadOutcome::Skipped(SkipReason::UnrecognizedExtension) => self.unrecognized += 1,
            DownloadOutcome::Failed { attempts, reason } => self.failed.push(FailedDownload {
                name: name.to_string(),
                url: url.to_string(),
                attempts,
                reason,
            }),
        }
    }

    /// Outcomes recorded for targets that were actually scheduled.
    pub fn terminal_count(&self) -> u64 {
        self.downloaded + self.not_found + self.videos_skipped + self.failed.len() as u64
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.len() as u64
    }

    pub fn skipped_count(&self) -> u64 {
        self.not_found + self.videos_skipped + self.unrecognized
    }
}

/// What a whole run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Estimate from the count pre-query.
    pub estimated_posts: u64,
    pub posts_examined: u64,
    pub targets_resolved: u64,
    /// `None` when the run stopped before the download stage.
    pub report: Option<DownloadReport>,
}

impl RunSummary {
    /// Summary of a run that found nothing to search.
    pub fn no_items() -> Self {
        Self::default()
    }

    pub fn reached_download(&self) -> bool {
        self.report.is_some()
    }
}
