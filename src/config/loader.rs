//! Configuration structures and loading logic.

use crate::config::validation::DateRange;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default Pushshift submission search endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pushshift.io/reddit/search/submission/";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub dates: DatesConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Download destination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Root folder that receives one directory per subreddit.
    #[serde(default = "default_download_folder")]
    pub download_folder: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            download_folder: default_download_folder(),
        }
    }
}

/// Date range filters, `YYYY-MM-DD` or empty for unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatesConfig {
    #[serde(default)]
    pub before: String,

    #[serde(default)]
    pub after: String,
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Submission search endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Number of posts requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
        }
    }
}

fn default_download_folder() -> PathBuf {
    PathBuf::from("assets")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    100
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse the configured date filters into unix timestamps.
    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::parse(&self.dates.before, &self.dates.after)
    }

    /// Get the effective download root folder.
    pub fn download_folder(&self) -> &Path {
        &self.bot.download_folder
    }
}
