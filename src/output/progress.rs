//! Progress bar utilities.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Create a progress bar for item counts.
pub fn create_item_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let template = format!(
        "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
        message
    );
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

/// Counts completed units of work against a total that may grow.
///
/// Clones share the same counters, so workers can advance one tracker
/// concurrently. The displayed bar is optional.
#[derive(Clone)]
pub struct ProgressTracker {
    bar: ProgressBar,
    completed: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
}

impl ProgressTracker {
    /// Tracker with a visible bar.
    pub fn new(total: u64, message: &str) -> Self {
        Self::with_bar(create_item_bar(total, message), total)
    }

    /// Tracker that only counts.
    pub fn hidden(total: u64) -> Self {
        Self::with_bar(ProgressBar::hidden(), total)
    }

    fn with_bar(bar: ProgressBar, total: u64) -> Self {
        bar.set_length(total);
        Self {
            bar,
            completed: Arc::new(AtomicU64::new(0)),
            total: Arc::new(AtomicU64::new(total)),
        }
    }

    /// Mark one unit done. The total follows when the count overtakes it.
    pub fn advance(&self) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.total.fetch_max(completed, Ordering::SeqCst);
        if completed > previous {
            self.bar.set_length(completed);
        }
        self.bar.inc(1);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
