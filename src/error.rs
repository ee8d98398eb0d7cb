//! Error types for the subreddit-downloader application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Date format is wrong for '{field}': '{value}'. Please use YYYY-MM-DD")]
    InvalidDate { field: String, value: String },

    // Search provider errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Cannot create download folder {}: {source}. Is your download folder written correctly?", path.display())]
    DownloadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Network client already closed")]
    ClientClosed,

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // Gif assembly errors
    #[error("Media error: {0}")]
    Media(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::InvalidDate { .. }
            | Error::TomlParse(_)
            | Error::UrlParse(_) => exit_codes::CONFIG_ERROR,
            Error::Api(_)
            | Error::RateLimited(_)
            | Error::ServerError(_)
            | Error::Http(_)
            | Error::Json(_) => exit_codes::API_ERROR,
            Error::Download(_)
            | Error::DownloadFolder { .. }
            | Error::ClientClosed
            | Error::InvalidFilename(_) => exit_codes::DOWNLOAD_ERROR,
            Error::Io(_) | Error::Media(_) => exit_codes::UNEXPECTED_ERROR,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let date = Error::InvalidDate {
            field: "before".into(),
            value: "01/02/2020".into(),
        };
        assert_eq!(date.exit_code(), exit_codes::CONFIG_ERROR);
        assert!(date.to_string().contains("YYYY-MM-DD"));

        assert_eq!(Error::ServerError(502).exit_code(), exit_codes::API_ERROR);

        let folder = Error::DownloadFolder {
            path: PathBuf::from("/root/x"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(folder.exit_code(), exit_codes::DOWNLOAD_ERROR);
        assert!(folder.to_string().contains("download folder"));

        let io = Error::Io(std::io::Error::from(std::io::ErrorKind::Other));
        assert_eq!(io.exit_code(), exit_codes::UNEXPECTED_ERROR);

        let media = Error::Media("Failed to open image: bad header".into());
        assert_eq!(media.exit_code(), exit_codes::UNEXPECTED_ERROR);
    }
}
