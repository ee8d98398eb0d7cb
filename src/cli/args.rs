//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::api::DEFAULT_POOL_LIMIT;
use crate::config::Config;
use crate::download::DEFAULT_MAX_ATTEMPTS;
use crate::gif::{Fit, DEFAULT_DELAY};

/// Subreddit media downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "subreddit-downloader",
    version,
    about = "Download images and gifs posted to a subreddit",
    long_about = "A CLI tool to bulk download the media posted to a subreddit.\n\n\
                  Posts are found through the Pushshift search API, optionally limited to a date \
                  range, and saved under <directory>/<subreddit>/{images,gifs,videos}."
)]
pub struct Args {
    /// Subreddit to download from, with or without the r/ prefix.
    pub subreddit: String,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Root directory for downloads.
    #[arg(short = 'd', long = "directory", env = "SUBREDDIT_DOWNLOAD_FOLDER")]
    pub download_directory: Option<PathBuf>,

    /// Only posts created before this date (YYYY-MM-DD).
    #[arg(long)]
    pub before: Option<String>,

    /// Only posts created after this date (YYYY-MM-DD).
    #[arg(long)]
    pub after: Option<String>,

    /// Maximum number of simultaneous downloads.
    #[arg(long, default_value_t = DEFAULT_POOL_LIMIT)]
    pub pool_limit: usize,

    /// Attempts per download, including the first one.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Stop after this many posts.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Assemble the downloaded images into looping gifs after the run.
    #[arg(long)]
    pub make_gif: bool,

    /// Skip downloading and only assemble gifs from images already on disk.
    #[arg(long)]
    pub gif_only: bool,

    /// Gif frame delay in hundredths of a second.
    #[arg(long, default_value_t = DEFAULT_DELAY)]
    pub delay: u16,

    /// Scale gif frames to fill the frame, cropping the overflow.
    #[arg(long)]
    pub cover: bool,

    /// Scale gif frames to fit inside the frame. The default unless --cover is given.
    #[arg(long)]
    pub contain: bool,

    /// Submission search endpoint.
    #[arg(long, env = "PUSHSHIFT_API_URL")]
    pub api_url: Option<String>,

    /// Hide progress bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Whether gifs are assembled in this run.
    pub fn wants_gif(&self) -> bool {
        self.make_gif || self.gif_only
    }

    /// Frame fits requested for gifs, contain first.
    pub fn gif_fits(&self) -> Vec<Fit> {
        let mut fits = Vec::new();
        if self.contain || !self.cover {
            fits.push(Fit::Contain);
        }
        if self.cover {
            fits.push(Fit::Cover);
        }
        fits
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.download_directory {
            config.bot.download_folder = dir.clone();
        }

        if let Some(before) = &self.before {
            config.dates.before = before.clone();
        }

        if let Some(after) = &self.after {
            config.dates.after = after.clone();
        }

        if let Some(api_url) = &self.api_url {
            config.search.api_url = api_url.clone();
        }
    }
}
