use serde::Deserialize;

/// The rectangle of a display, in screen coordinates.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct DisplayBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayBounds {
    fn default() -> Self {
        DisplayBounds {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        }
    }
}
