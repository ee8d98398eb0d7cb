//! Subreddit Downloader - bulk media downloads for a subreddit.
//!
//! This library finds the posts of a subreddit through a search provider,
//! resolves each post to the media behind it and downloads that media
//! concurrently into per-type folders.
//!
//! # Features
//!
//! - Direct images, imgur `.gifv`, reddit galleries and hosted videos
//! - Date range filters
//! - Bounded download concurrency with retry and backoff
//! - Progress reporting for posts and downloads
//! - Optional looping gifs assembled from the downloaded images
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use subreddit_downloader::{
//!     Config, NetworkClient, Pipeline, PushshiftApi, RetryPolicy, RunSettings,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let client = Arc::new(NetworkClient::new(10)?);
//!     let settings = RunSettings {
//!         subreddit: "earthporn".into(),
//!         dates: config.date_range()?,
//!         download_folder: config.download_folder().to_path_buf(),
//!         pool_limit: 10,
//!         retry_policy: RetryPolicy::default(),
//!         post_limit: None,
//!         show_progress: true,
//!     };
//!
//!     let provider = PushshiftApi::new(&config.search)?;
//!     let pipeline = Pipeline::new(settings, Box::new(provider), Arc::clone(&client));
//!     let summary = pipeline.run().await;
//!     client.close();
//!
//!     println!("{:?}", summary?);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod gif;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{NetworkClient, PushshiftApi, SearchProvider};
pub use config::Config;
pub use download::{DownloadReport, Pipeline, RetryPolicy, RunSettings, RunSummary};
pub use error::{Error, Result};
pub use media::{MediaKind, MediaTarget};
