pub mod color;
mod dimming;
mod display_bounds;
pub mod pixel_grid;

pub use color::Color;
pub use dimming::Dimming;
pub use display_bounds::DisplayBounds;
pub use pixel_grid::PixelGrid;
