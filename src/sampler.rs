use crate::domain::{Color, PixelGrid};
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct SampleConfig {
    /// Distance in pixels between two samples, on both axes.
    pub stride: NonZeroU32,
    /// Quantized samples at or below this brightness are ignored.
    pub brightness_floor: f32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            stride: NonZeroU32::MIN.saturating_add(4),
            brightness_floor: 0.1,
        }
    }
}

/// Reduces `grid` to the most frequent quantized color among its sufficiently bright samples.
///
/// Samples are taken column by column. When several colors share the highest count, the one that
/// reached that count first wins. A grid without any surviving sample yields [`Color::FALLBACK`].
pub fn sample<G: PixelGrid + ?Sized>(grid: &G, config: &SampleConfig) -> Color {
    let stride = config.stride.get() as usize;
    let mut counts: HashMap<Color, u32> = HashMap::new();
    let mut dominant: Option<(Color, u32)> = None;

    for x in (0..grid.width()).step_by(stride) {
        for y in (0..grid.height()).step_by(stride) {
            let quantized = grid.pixel(x, y).quantize();
            if quantized.brightness() <= config.brightness_floor {
                continue;
            }

            let count = counts.entry(quantized).or_insert(0);
            *count += 1;

            if dominant.is_none_or(|(_, best)| *count > best) {
                dominant = Some((quantized, *count));
            }
        }
    }

    dominant.map_or(Color::FALLBACK, |(color, _)| color)
}
