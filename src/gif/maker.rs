//! Frame fitting and gif encoding.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, DynamicImage, Frame, Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::fs::subreddit_folder;
use crate::gif::batch::{batch_frames, collect_frames, BATCH_SIZE};
use crate::media::MediaKind;

/// Frame delay in hundredths of a second.
pub const DEFAULT_DELAY: u16 = 22;

/// Default gif frame size.
pub const FRAME_WIDTH: u32 = 2000;
pub const FRAME_HEIGHT: u32 = 1250;

/// Encoder speed, 1 (best palette) to 30 (fastest).
const ENCODER_SPEED: i32 = 10;

/// How an image is fitted into the gif frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale to fit inside the frame, padding the rest with black.
    Contain,
    /// Scale to fill the frame, cropping the overflow around the center.
    Cover,
}

impl Fit {
    fn label(&self) -> &'static str {
        match self {
            Fit::Contain => "contain",
            Fit::Cover => "cover",
        }
    }

    fn name_suffix(&self) -> &'static str {
        match self {
            Fit::Contain => "",
            Fit::Cover => "-cover",
        }
    }
}

/// Settings for one gif run over a subreddit's images.
#[derive(Debug, Clone)]
pub struct GifSettings {
    pub root: PathBuf,
    pub subreddit: String,
    pub delay: u16,
    pub fits: Vec<Fit>,
    pub width: u32,
    pub height: u32,
    pub batch_size: usize,
}

impl GifSettings {
    pub fn new(root: impl Into<PathBuf>, subreddit: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            subreddit: subreddit.into(),
            delay: DEFAULT_DELAY,
            fits: vec![Fit::Contain],
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_delay(mut self, delay: u16) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_fits(mut self, fits: Vec<Fit>) -> Self {
        self.fits = fits;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Builds looping gifs from the images already downloaded for a subreddit.
///
/// Resized frames are cached under
/// `root/resized/downloads-resized-<fit>-<batch>/<subreddit>/images` and
/// reused by later runs. Gifs are written to
/// `root/gifs/<subreddit>-<batch>-<delay>[-cover].gif`.
#[derive(Debug, Clone)]
pub struct GifMaker {
    settings: GifSettings,
}

impl GifMaker {
    pub fn new(settings: GifSettings) -> Self {
        Self { settings }
    }

    fn source_dir(&self) -> PathBuf {
        subreddit_folder(&self.settings.root, &self.settings.subreddit)
            .join(MediaKind::Image.folder_name())
    }

    fn resized_dir(&self, fit: Fit, batch: usize) -> PathBuf {
        self.settings
            .root
            .join("resized")
            .join(format!("downloads-resized-{}-{}", fit.label(), batch))
            .join(&self.settings.subreddit)
            .join(MediaKind::Image.folder_name())
    }

    fn gif_path(&self, fit: Fit, batch: usize) -> PathBuf {
        self.settings.root.join("gifs").join(format!(
            "{}-{}-{}{}.gif",
            self.settings.subreddit,
            batch,
            self.settings.delay,
            fit.name_suffix()
        ))
    }

    /// Resize every batch for every fit and encode one gif per batch and
    /// fit. Blocking; returns the gifs written.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        let frames = collect_frames(&self.source_dir())?;
        tracing::info!("{} images found for r/{}", frames.len(), self.settings.subreddit);

        let batches = batch_frames(frames, self.settings.batch_size);
        let mut written = Vec::new();

        for (index, batch) in batches.iter().enumerate() {
            tracing::debug!("Batch {} holds {} images", index, batch.len());
            for &fit in &self.settings.fits {
                let resized = self.resize_batch(fit, index, batch)?;
                if resized.is_empty() {
                    tracing::warn!("Batch {} has no usable images, no gif written", index);
                    continue;
                }

                let dest = self.gif_path(fit, index);
                self.encode(&resized, &dest)?;
                tracing::info!("Wrote {} ({} frames)", dest.display(), resized.len());
                written.push(dest);
            }
        }

        Ok(written)
    }

    /// Fit each image of a batch and save it, skipping frames resized by an
    /// earlier run. Images that cannot be read are logged and left out.
    fn resize_batch(&self, fit: Fit, index: usize, batch: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let dir = self.resized_dir(fit, index);
        std::fs::create_dir_all(&dir).map_err(|source| Error::DownloadFolder {
            path: dir.clone(),
            source,
        })?;

        let mut resized = Vec::with_capacity(batch.len());
        for source in batch {
            let Some(name) = source.file_name() else {
                continue;
            };
            let output = dir.join(name);
            if output.exists() {
                tracing::debug!("{} already resized", output.display());
                resized.push(output);
                continue;
            }

            match self.resize_one(fit, source, &output) {
                Ok(()) => resized.push(output),
                Err(e) => tracing::warn!("Skipping {}: {}", source.display(), e),
            }
        }

        Ok(resized)
    }

    fn resize_one(&self, fit: Fit, source: &Path, output: &Path) -> Result<()> {
        let image = image::open(source)
            .map_err(|e| Error::Media(format!("Failed to open image: {}", e)))?;
        let frame = fit_frame(&image, fit, self.settings.width, self.settings.height);

        DynamicImage::ImageRgba8(frame)
            .to_rgb8()
            .save(output)
            .map_err(|e| Error::Media(format!("Failed to save frame: {}", e)))
    }

    fn encode(&self, frames: &[PathBuf], dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DownloadFolder {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = BufWriter::new(File::create(dest)?);
        let mut encoder = GifEncoder::new_with_speed(file, ENCODER_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| Error::Media(format!("Failed to start gif: {}", e)))?;

        let delay = Delay::from_numer_denom_ms(u32::from(self.settings.delay) * 10, 1);
        for path in frames {
            let image = match image::open(path) {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!("Skipping frame {}: {}", path.display(), e);
                    continue;
                }
            };
            // Cached frames from an earlier run may use another frame size.
            let buffer = fit_frame(&image, Fit::Contain, self.settings.width, self.settings.height);
            encoder
                .encode_frame(Frame::from_parts(buffer, 0, 0, delay))
                .map_err(|e| Error::Media(format!("Failed to encode frame: {}", e)))?;
        }

        Ok(())
    }
}

/// Fit an image into a `width` x `height` frame.
pub fn fit_frame(image: &DynamicImage, fit: Fit, width: u32, height: u32) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    let (w, h) = (image.width().max(1) as f64, image.height().max(1) as f64);
    let (fw, fh) = (width as f64, height as f64);

    match fit {
        Fit::Contain => {
            let scale = (fw / w).min(fh / h);
            let nw = ((w * scale).round() as u32).clamp(1, width);
            let nh = ((h * scale).round() as u32).clamp(1, height);
            let resized = imageops::resize(image, nw, nh, FilterType::Triangle);

            let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
            let x = i64::from((width - nw) / 2);
            let y = i64::from((height - nh) / 2);
            imageops::overlay(&mut canvas, &resized, x, y);
            canvas
        }
        Fit::Cover => {
            let scale = (fw / w).max(fh / h);
            let nw = ((w * scale).ceil() as u32).max(width);
            let nh = ((h * scale).ceil() as u32).max(height);
            let resized = imageops::resize(image, nw, nh, FilterType::Triangle);

            let x = (nw - width) / 2;
            let y = (nh - height) / 2;
            imageops::crop_imm(&resized, x, y, width, height).to_image()
        }
    }
}
