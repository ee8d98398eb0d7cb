//! Download module.
//!
//! This module provides:
//! - Single-attempt fetching and the retry wrapper around it
//! - Bounded-concurrency scheduling of a batch of targets
//! - Outcome and run statistics
//! - The run pipeline tying search, resolution and download together

pub mod fetcher;
pub mod pipeline;
pub mod retry;
pub mod scheduler;
pub mod state;

pub use fetcher::{Fetch, FetchError, HttpFetcher, ScheduledTarget};
pub use pipeline::{Pipeline, RunSettings};
pub use retry::{with_retry, Backoff, RetryError, RetryPolicy, Retryable, DEFAULT_MAX_ATTEMPTS};
pub use scheduler::DownloadScheduler;
pub use state::{DownloadOutcome, DownloadReport, FailedDownload, RunSummary, SkipReason};
