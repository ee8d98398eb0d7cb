//! Frame discovery and batching.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Frames per gif before the last two batches are merged.
pub const BATCH_SIZE: usize = 360;

const FRAME_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// List the still images in `dir` in natural file name order.
///
/// A missing directory yields no frames.
pub fn collect_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_frame = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_frame && path.is_file() {
            frames.push(path);
        }
    }

    frames.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(frames)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare two names so that digit runs order by value: `p2` < `p10`.
/// Letters compare without case first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp_folded(a, b).then_with(|| a.cmp(b))
}

fn natural_cmp_folded(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let l_trim = l_run.trim_start_matches('0');
                let r_trim = r_run.trim_start_matches('0');
                let ord = l_trim
                    .len()
                    .cmp(&r_trim.len())
                    .then_with(|| l_trim.cmp(r_trim))
                    .then_with(|| l_run.len().cmp(&r_run.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        chars.next();
    }
    run
}

/// Split frames into batches of `size`, folding the last batch into the one
/// before it so no gif is left with a short tail.
pub fn batch_frames(frames: Vec<PathBuf>, size: usize) -> Vec<Vec<PathBuf>> {
    let size = size.max(1);
    let mut batches: Vec<Vec<PathBuf>> = frames.chunks(size).map(<[PathBuf]>::to_vec).collect();

    if batches.len() >= 2 {
        if let Some(last) = batches.pop() {
            if let Some(previous) = batches.last_mut() {
                previous.extend(last);
            }
        }
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_natural_order() {
        let mut names = vec!["p10.jpg", "p2.jpg", "P1.jpg", "p2_1.jpg", "a.png"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["a.png", "P1.jpg", "p2.jpg", "p2_1.jpg", "p10.jpg"]);

        assert_eq!(natural_cmp("007", "7"), Ordering::Greater);
        assert_eq!(natural_cmp("x", "x"), Ordering::Equal);
    }

    #[test]
    fn test_last_two_batches_merge() {
        let frames = paths(&["1", "2", "3", "4", "5", "6", "7"]);
        let sizes: Vec<usize> = batch_frames(frames, 3).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 4]);

        let frames = paths(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
        let sizes: Vec<usize> = batch_frames(frames, 3).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 4]);
    }

    #[test]
    fn test_small_and_empty_batches() {
        let sizes: Vec<usize> = batch_frames(paths(&["1", "2"]), 3).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2]);

        // Two full batches become one.
        let sizes: Vec<usize> = batch_frames(paths(&["1", "2", "3", "4"]), 2).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4]);

        assert!(batch_frames(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_collect_frames_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["p10.jpg", "p2.png", "p1.JPEG", "clip.mp4", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let frames = collect_frames(dir.path()).unwrap();
        let names: Vec<String> = frames.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["p1.JPEG", "p2.png", "p10.jpg"]);
    }

    #[test]
    fn test_collect_frames_missing_dir() {
        let dir = TempDir::new().unwrap();
        let frames = collect_frames(&dir.path().join("absent")).unwrap();
        assert!(frames.is_empty());
    }
}
