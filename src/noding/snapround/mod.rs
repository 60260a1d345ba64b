//! Snap rounding: noding on a fixed precision grid.

pub mod hot_pixel;
pub mod snap_rounder;

pub use hot_pixel::HotPixel;
pub use snap_rounder::SnapRoundingNoder;
