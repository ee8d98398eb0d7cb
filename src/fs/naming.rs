//! Filename sanitization for target names and the subreddit folder.

use crate::error::{Error, Result};

/// Characters that are invalid in file names on at least one platform.
const RESERVED: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// Sanitize a target file name such as `abc_3.jpg`.
///
/// Path separators and `..` are rejected outright since a name must never
/// leave its media folder; other reserved characters become `_`.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }
    sanitize(name, false)
}

/// Sanitize a single path component, replacing separators with `_`.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    sanitize(name, true)
}

fn sanitize(name: &str, replace_separators: bool) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            let separator = c == '/' || c == '\\';
            if RESERVED.contains(&c) || c.is_control() || (replace_separators && separator) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Name cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}
