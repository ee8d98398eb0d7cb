//! Single-attempt media fetching.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::download::retry::Retryable;
use crate::download::state::{DownloadOutcome, SkipReason};
use crate::error::Error;
use crate::fs::DiskWriter;
use crate::media::resolver::is_hosted_video;
use crate::media::{MediaKind, MediaTarget};

/// A target whose url carries a recognized extension, ready to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTarget {
    pub name: String,
    /// Name plus extension, e.g. `abc_2.jpg`.
    pub file_name: String,
    pub url: String,
    pub kind: MediaKind,
}

impl ScheduledTarget {
    /// `None` when the url has no recognized media extension.
    pub fn from_target(target: MediaTarget) -> Option<Self> {
        let file_name = target.file_name()?;
        Some(Self {
            kind: MediaKind::from_file_name(&file_name),
            file_name,
            name: target.name,
            url: target.url,
        })
    }
}

/// Failure of one fetch attempt.
#[derive(Debug)]
pub enum FetchError {
    /// Worth another attempt: transport errors, 5xx and other unexpected statuses.
    Transient(String),
    /// Will not improve on retry but only affects this target.
    Permanent(String),
    /// Aborts the whole run.
    Fatal(Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transient(reason) | FetchError::Permanent(reason) => f.write_str(reason),
            FetchError::Fatal(e) => write!(f, "{}", e),
        }
    }
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

/// One fetch attempt for a scheduled target.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn attempt(&self, target: &ScheduledTarget) -> Result<DownloadOutcome, FetchError>;
}

/// Fetches over HTTP and persists through a [`DiskWriter`].
pub struct HttpFetcher {
    client: Client,
    writer: DiskWriter,
}

impl HttpFetcher {
    pub fn new(client: Client, writer: DiskWriter) -> Self {
        Self { client, writer }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn attempt(&self, target: &ScheduledTarget) -> Result<DownloadOutcome, FetchError> {
        if target.kind == MediaKind::Video || is_hosted_video(&target.url) {
            tracing::info!("Skip downloading video {}", target.url);
            return Ok(DownloadOutcome::Skipped(SkipReason::VideoUnsupported));
        }

        let response = self
            .client
            .get(&target.url)
            .send()
            .await
            .map_err(|e| FetchError::Transient(format!("Request failed: {}", e)))?;

        let status = response.status();
        // Reddit answers 403 for deleted hosted media.
        if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
            tracing::debug!("{} is gone (HTTP {})", target.url, status);
            return Ok(DownloadOutcome::Skipped(SkipReason::NotFound));
        }
        if !status.is_success() {
            return Err(FetchError::Transient(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transient(format!("Stream error: {}", e)))?;

        match self.writer.write(&target.file_name, &body).await {
            Ok(path) => Ok(DownloadOutcome::Success { path }),
            Err(e @ Error::DownloadFolder { .. }) => Err(FetchError::Fatal(e)),
            Err(e @ Error::InvalidFilename(_)) => Err(FetchError::Permanent(e.to_string())),
            Err(e) => Err(FetchError::Transient(e.to_string())),
        }
    }
}
