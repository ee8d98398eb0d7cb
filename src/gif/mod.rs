//! Animated gif assembly from downloaded images.
//!
//! Images saved under `root/subreddit/images` are sorted, split into
//! batches, fitted to a common frame size and encoded as looping gifs under
//! `root/gifs`.

pub mod batch;
pub mod maker;

pub use batch::{batch_frames, collect_frames, natural_cmp, BATCH_SIZE};
pub use maker::{fit_frame, Fit, GifMaker, GifSettings, DEFAULT_DELAY};
