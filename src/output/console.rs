//! Console output utilities.

use std::path::Path;

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print a debug message.
pub fn print_debug(message: &str) {
    println!("{} {}", style("DEBUG").dim(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Subreddit Downloader                              ║
║     Bulk media downloads from subreddit archives      ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(subreddit: &str, download_dir: &Path, pool_limit: usize) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Subreddit: r/{}", subreddit);
    println!("  Directory: {}", download_dir.display());
    println!("  Parallel downloads: {}", pool_limit);
    println!();
}
