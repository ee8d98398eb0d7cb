//! Media module for target representation and post resolution.

pub mod gallery;
pub mod item;
pub mod resolver;

pub use gallery::{expand_gallery, normalize_url};
pub use item::{recognized_extension, MediaKind, MediaTarget, MediaTargetSet};
pub use resolver::{resolve_post, GifvLookup, ImgurGifvLookup};
