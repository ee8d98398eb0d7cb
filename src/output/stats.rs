//! Statistics reporting.

use std::time::Duration;

use console::style;

use crate::download::RunSummary;

/// Print what a run did, including every failed download.
pub fn print_run_summary(summary: &RunSummary) {
    let Some(report) = &summary.report else {
        return;
    };

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run Statistics:").bold());
    println!("  Posts examined:  {}", summary.posts_examined);
    println!("  Media resolved:  {}", summary.targets_resolved);
    println!("  Downloaded:      {}", style(report.downloaded).green());
    println!("  Deleted/missing: {}", report.not_found);
    println!("  Videos skipped:  {}", report.videos_skipped);
    println!("  Unrecognized:    {}", report.unrecognized);
    if !report.failed.is_empty() {
        println!("  Failed:          {}", style(report.failed_count()).red());
        for failed in &report.failed {
            println!(
                "    {} {} ({} attempts: {})",
                style("✗").red(),
                failed.url,
                failed.attempts,
                failed.reason
            );
        }
    }
    println!("{}", style("═".repeat(50)).dim());
}

/// Elapsed time in minutes, two decimals.
pub fn format_exec_time(elapsed: Duration) -> String {
    format!("Exec time: {:.2} minutes", elapsed.as_secs_f64() / 60.0)
}

pub fn print_exec_time(elapsed: Duration) {
    println!("{}", format_exec_time(elapsed));
}
