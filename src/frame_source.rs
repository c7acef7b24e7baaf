use crate::domain::DisplayBounds;
use image::{ImageError, RgbImage, imageops};
use std::path::PathBuf;
use thiserror::Error;
use tracing::trace;

/// Produces the pixels currently shown inside a display's bounds.
pub trait FrameSource: Send {
    fn capture(&mut self, bounds: &DisplayBounds) -> Result<RgbImage, FrameSourceError>;
}

/// Reads the frame from an image file on every capture, any screenshot tool that keeps rewriting the file can feed it.
/// Decoding blocks the calling thread.
#[derive(Debug)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ImageFileSource { path: path.into() }
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&mut self, bounds: &DisplayBounds) -> Result<RgbImage, FrameSourceError> {
        let image = image::open(&self.path)
            .map_err(|source| FrameSourceError::Image {
                path: self.path.clone(),
                source,
            })?
            .into_rgb8();
        trace!(width = image.width(), height = image.height(), "Read frame from '{}'", self.path.display());

        // Bounds outside the image are clamped, possibly down to an empty frame
        Ok(imageops::crop_imm(&image, bounds.x, bounds.y, bounds.width, bounds.height).to_image())
    }
}

#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("unable to read frame from '{}': {source}", .path.display())]
    Image { path: PathBuf, source: ImageError },
}
