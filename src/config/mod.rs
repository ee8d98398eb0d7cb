//! Configuration module for the subreddit-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Date filter and subreddit name validation

pub mod loader;
pub mod validation;

pub use loader::{BotConfig, Config, DatesConfig, SearchConfig};
pub use validation::{parse_date, validate_subreddit, DateRange};
