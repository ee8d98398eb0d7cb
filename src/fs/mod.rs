//! Filesystem module.
//!
//! Provides:
//! - Destination path layout
//! - Filename sanitization
//! - Writing downloaded bodies to disk

pub mod naming;
pub mod paths;
pub mod writer;

pub use naming::{sanitize_filename, sanitize_path_component};
pub use paths::{destination_dir, ensure_dir, subreddit_folder};
pub use writer::DiskWriter;
