//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress tracking
//! - Run summary reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_debug, print_error, print_info, print_success,
    print_warning,
};
pub use progress::{create_item_bar, create_spinner, ProgressTracker};
pub use stats::{print_exec_time, print_run_summary};
