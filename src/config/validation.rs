//! Configuration validation logic.

use chrono::{Local, NaiveDate, TimeZone};
use regex::Regex;

use crate::error::{Error, Result};

/// Date format accepted for the before/after filters.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimum subreddit name length.
const MIN_SUBREDDIT_LENGTH: usize = 2;

/// Maximum subreddit name length.
const MAX_SUBREDDIT_LENGTH: usize = 21;

/// Parsed date filters as unix timestamps (seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub before: Option<i64>,
    pub after: Option<i64>,
}

impl DateRange {
    /// Parse the raw `before`/`after` strings. Empty strings mean unbounded.
    pub fn parse(before: &str, after: &str) -> Result<Self> {
        let range = Self {
            before: parse_date("before", before)?,
            after: parse_date("after", after)?,
        };

        if let (Some(before), Some(after)) = (range.before, range.after) {
            if after >= before {
                return Err(Error::ConfigValidation {
                    field: "dates".to_string(),
                    message: "'after' must be earlier than 'before'".to_string(),
                });
            }
        }

        Ok(range)
    }

    /// Whether no bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// Parse a `YYYY-MM-DD` string into the unix timestamp of local midnight.
pub fn parse_date(field: &str, value: &str) -> Result<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let invalid = || Error::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    };

    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(invalid)?;

    Ok(Some(local.timestamp()))
}

/// Validate a subreddit name, returning it without any `r/` prefix.
pub fn validate_subreddit(name: &str) -> Result<String> {
    let name = name.trim();
    let clean = name
        .strip_prefix("/r/")
        .or_else(|| name.strip_prefix("r/"))
        .unwrap_or(name);

    if clean.len() < MIN_SUBREDDIT_LENGTH || clean.len() > MAX_SUBREDDIT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "subreddit".to_string(),
            message: format!(
                "Subreddit '{}' must be {}-{} characters long",
                name, MIN_SUBREDDIT_LENGTH, MAX_SUBREDDIT_LENGTH
            ),
        });
    }

    let pattern = Regex::new(r"^[A-Za-z0-9_]+$").map_err(|e| Error::Config(e.to_string()))?;
    if !pattern.is_match(clean) {
        return Err(Error::ConfigValidation {
            field: "subreddit".to_string(),
            message: format!(
                "Subreddit '{}' contains invalid characters. Only alphanumeric and underscores allowed.",
                name
            ),
        });
    }

    Ok(clean.to_string())
}
