//! Post classification into download targets.

use crate::api::types::Post;
use crate::media::gallery::expand_gallery;
use crate::media::item::MediaTarget;

/// Url prefix of reddit gallery posts.
pub const GALLERY_PREFIX: &str = "https://www.reddit.com/gallery/";

/// Url prefix of reddit-hosted videos.
pub const VIDEO_PREFIX: &str = "https://v.redd.it/";

/// Suffixes of directly downloadable images.
const DIRECT_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".gif", ".png"];

/// Looks up the real media behind a `.gifv` page.
pub trait GifvLookup: Send + Sync {
    fn resolve(&self, url: &str) -> Option<String>;
}

/// Imgur serves the underlying gif next to its `.gifv` wrapper page.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImgurGifvLookup;

impl GifvLookup for ImgurGifvLookup {
    fn resolve(&self, url: &str) -> Option<String> {
        let parsed = url::Url::parse(url).ok()?;
        if parsed.host_str() != Some("i.imgur.com") {
            return None;
        }
        url.strip_suffix(".gifv").map(|stem| format!("{}.gif", stem))
    }
}

/// Resolve a post to zero or more download targets.
///
/// Rules are checked in order and the first match wins: direct image,
/// `.gifv`, gallery, hosted video. Anything else is an external link and
/// yields nothing.
pub fn resolve_post(post: &Post, gifv: &dyn GifvLookup) -> Vec<MediaTarget> {
    let Some(url) = post.url.as_deref() else {
        return Vec::new();
    };

    if DIRECT_SUFFIXES.iter().any(|suffix| url.ends_with(suffix)) {
        return vec![MediaTarget::new(&post.id, url)];
    }

    if url.ends_with(".gifv") {
        return gifv
            .resolve(url)
            .map(|link| vec![MediaTarget::new(&post.id, link)])
            .unwrap_or_default();
    }

    if url.starts_with(GALLERY_PREFIX) {
        // Removed posts keep the gallery url but lose their metadata.
        return match &post.media_metadata {
            Some(metadata) => expand_gallery(&post.id, metadata).into_iter().collect(),
            None => Vec::new(),
        };
    }

    if url.starts_with(VIDEO_PREFIX) {
        return resolve_video(post)
            .map(|link| vec![MediaTarget::new(&post.id, link)])
            .unwrap_or_default();
    }

    tracing::trace!("Ignoring external link {}", url);
    Vec::new()
}

fn resolve_video(post: &Post) -> Option<String> {
    post.media
        .as_ref()?
        .reddit_video
        .as_ref()
        .and_then(|video| video.fallback_url.clone())
}

/// Whether a url points at reddit-hosted video.
pub fn is_hosted_video(url: &str) -> bool {
    url.starts_with("https://v.redd.it")
}
