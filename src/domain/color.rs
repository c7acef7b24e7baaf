use crate::extensions::Quantize;
use std::fmt::{Display, Formatter};

/// An 8-bit RGB color without alpha.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Sent when a frame carries no usable signal.
    pub const FALLBACK: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Floors every channel to its bucket, leaving at most 512 distinct colors.
    pub fn quantize(self) -> Color {
        Color::new(self.r.quantize(), self.g.quantize(), self.b.quantize())
    }

    /// HSL lightness in [0, 1].
    pub fn brightness(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b) as f32;
        let min = self.r.min(self.g).min(self.b) as f32;
        (max + min) / 2.0 / 255.0
    }

    /// Interpolates linearly towards `other`, `t` is clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t).round() as u8;

        Color::new(channel(self.r, other.r), channel(self.g, other.g), channel(self.b, other.b))
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::new(r, g, b)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
