//! Media target representation.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// Type of media content, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

impl MediaKind {
    /// Classify a file name (or bare extension) by its extension.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with("mp4") {
            MediaKind::Video
        } else if name.ends_with("gif") || name.ends_with("gifv") {
            MediaKind::Gif
        } else {
            MediaKind::Image
        }
    }

    /// Get the folder name for this media kind.
    pub fn folder_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Gif => "gifs",
            MediaKind::Video => "videos",
        }
    }
}

/// A single `(name, url)` download unit. The name carries no extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTarget {
    pub name: String,
    pub url: String,
}

impl MediaTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// File name with the extension found in the URL, if it is recognized.
    pub fn file_name(&self) -> Option<String> {
        recognized_extension(&self.url).map(|ext| format!("{}.{}", self.name, ext))
    }
}

/// Target name to URL mapping. Names are unique; a repeated name replaces
/// the earlier URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaTargetSet {
    targets: BTreeMap<String, String>,
}

impl MediaTargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: MediaTarget) {
        self.targets.insert(target.name, target.url);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.targets.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Extend<MediaTarget> for MediaTargetSet {
    fn extend<I: IntoIterator<Item = MediaTarget>>(&mut self, iter: I) {
        for target in iter {
            self.insert(target);
        }
    }
}

impl FromIterator<MediaTarget> for MediaTargetSet {
    fn from_iter<I: IntoIterator<Item = MediaTarget>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for MediaTargetSet {
    type Item = MediaTarget;
    type IntoIter = std::vec::IntoIter<MediaTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets
            .into_iter()
            .map(|(name, url)| MediaTarget { name, url })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

fn extension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `\b` keeps `.gifv` from matching as `gif`.
    PATTERN.get_or_init(|| Regex::new(r"\.(jpe?g|png|gif|mp4)\b").expect("valid extension pattern"))
}

/// Find the first recognized media extension (`jpg`, `jpeg`, `png`, `gif`,
/// `mp4`) anywhere in a URL.
pub fn recognized_extension(url: &str) -> Option<&str> {
    extension_pattern()
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_folders() {
        assert_eq!(MediaKind::from_file_name("p1.mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_file_name("p1.gif"), MediaKind::Gif);
        assert_eq!(MediaKind::from_file_name("p1.gifv"), MediaKind::Gif);
        assert_eq!(MediaKind::from_file_name("p1.png"), MediaKind::Image);
        assert_eq!(MediaKind::from_file_name("p1.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::Video.folder_name(), "videos");
        assert_eq!(MediaKind::Gif.folder_name(), "gifs");
        assert_eq!(MediaKind::Image.folder_name(), "images");
    }

    #[test]
    fn test_recognized_extension() {
        assert_eq!(recognized_extension("http://x/img.png"), Some("png"));
        assert_eq!(recognized_extension("https://i.redd.it/abc.jpeg"), Some("jpeg"));
        assert_eq!(
            recognized_extension("https://preview.redd.it/abc.jpg?width=640&format=pjpg"),
            Some("jpg")
        );
        assert_eq!(
            recognized_extension("https://v.redd.it/xyz/DASH_720.mp4?source=fallback"),
            Some("mp4")
        );
        assert_eq!(recognized_extension("https://i.imgur.com/abc.gifv"), None);
        assert_eq!(recognized_extension("https://example.com/page.html"), None);
    }

    #[test]
    fn test_target_file_name() {
        let target = MediaTarget::new("p1", "http://x/img.png");
        assert_eq!(target.file_name().as_deref(), Some("p1.png"));

        let target = MediaTarget::new("p2", "https://example.com/article");
        assert_eq!(target.file_name(), None);
    }

    #[test]
    fn test_target_set_replaces_duplicate_names() {
        let mut set = MediaTargetSet::new();
        set.insert(MediaTarget::new("a", "http://x/1.jpg"));
        set.insert(MediaTarget::new("a", "http://x/2.jpg"));
        set.insert(MediaTarget::new("b", "http://x/3.jpg"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("a"), Some("http://x/2.jpg"));
    }
}
