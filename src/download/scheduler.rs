//! Bounded-concurrency download scheduling.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::download::fetcher::{Fetch, FetchError, ScheduledTarget};
use crate::download::retry::{with_retry, RetryError, RetryPolicy};
use crate::download::state::{DownloadOutcome, DownloadReport};
use crate::error::{Error, Result};
use crate::media::{MediaTarget, MediaTargetSet};
use crate::output::ProgressTracker;

/// Runs fetches for a batch of targets, at most `pool_limit` at a time.
#[derive(Debug, Clone)]
pub struct DownloadScheduler {
    pool_limit: usize,
    retry_policy: RetryPolicy,
}

impl DownloadScheduler {
    pub fn new(pool_limit: usize, retry_policy: RetryPolicy) -> Self {
        Self {
            pool_limit: pool_limit.max(1),
            retry_policy,
        }
    }

    /// Split resolved targets into schedulable ones and those whose url has
    /// no recognized extension.
    pub fn prepare(&self, targets: MediaTargetSet) -> (Vec<ScheduledTarget>, Vec<MediaTarget>) {
        let mut scheduled = Vec::with_capacity(targets.len());
        let mut unrecognized = Vec::new();

        for target in targets {
            if target.file_name().is_none() {
                tracing::warn!("Unrecognized link skipped. {}", target.url);
                unrecognized.push(target);
                continue;
            }
            if let Some(ready) = ScheduledTarget::from_target(target) {
                scheduled.push(ready);
            }
        }

        (scheduled, unrecognized)
    }

    /// Fetch every target, retrying transient failures, and collect one
    /// outcome per target.
    ///
    /// Returns early with the error when a fetch fails fatally; the remaining
    /// tasks are aborted.
    pub async fn run<F>(
        &self,
        fetcher: Arc<F>,
        targets: Vec<ScheduledTarget>,
        progress: &ProgressTracker,
    ) -> Result<DownloadReport>
    where
        F: Fetch + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.pool_limit));
        let mut tasks = JoinSet::new();

        tracing::debug!(
            "Scheduling {} downloads with a pool of {}",
            targets.len(),
            self.pool_limit
        );

        for target in targets {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&fetcher);
            let policy = self.retry_policy.clone();

            tasks.spawn(async move {
                // The permit covers every attempt of this target.
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let outcome = Err(Error::Download("Download pool closed".into()));
                        return (target, outcome);
                    }
                };

                let result = with_retry(&policy, |_| fetcher.attempt(&target)).await;
                let outcome = match result {
                    Ok(outcome) => Ok(outcome),
                    Err(RetryError::Aborted {
                        error: FetchError::Fatal(e),
                        ..
                    }) => Err(e),
                    Err(e) => {
                        let attempts = e.attempts();
                        Ok(DownloadOutcome::Failed {
                            attempts,
                            reason: e.into_inner().to_string(),
                        })
                    }
                };
                (target, outcome)
            });
        }

        let mut report = DownloadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((target, Ok(outcome))) => {
                    if let DownloadOutcome::Failed { attempts, reason } = &outcome {
                        tracing::warn!(
                            "Failed to download {} after {} attempt(s): {}",
                            target.url,
                            attempts,
                            reason
                        );
                    }
                    report.record(&target.name, &target.url, outcome);
                }
                Ok((target, Err(e))) => {
                    tracing::error!("Aborting downloads at {}: {}", target.name, e);
                    tasks.abort_all();
                    progress.finish();
                    return Err(e);
                }
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    tracing::error!("Download task panicked: {}", e);
                    report.record(
                        "<unknown>",
                        "",
                        DownloadOutcome::Failed {
                            attempts: 0,
                            reason: e.to_string(),
                        },
                    );
                }
            }
            progress.advance();
        }

        progress.finish();
        Ok(report)
    }
}
