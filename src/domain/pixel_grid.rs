use crate::domain::color::Color;
use image::RgbImage;

/// A read-only rectangle of pixels.
pub trait PixelGrid {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Returns the color at (`x`, `y`), callers stay within `width` × `height`.
    fn pixel(&self, x: u32, y: u32) -> Color;
}

impl PixelGrid for RgbImage {
    fn width(&self) -> u32 {
        self.width()
    }

    fn height(&self) -> u32 {
        self.height()
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        Color::from(self.get_pixel(x, y).0)
    }
}
