use image::{imageops, RgbaImage};

use crate::error::{ensure_non_empty, Result};

/// The largest square that fits an image, centered on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareRegion {
    pub left: u32,
    pub top: u32,
    pub side: u32,
}

pub fn square_region(width: u32, height: u32) -> Result<SquareRegion> {
    ensure_non_empty(width, height)?;
    let side = width.min(height);
    Ok(SquareRegion {
        left: (width - side) / 2,
        top: (height - side) / 2,
        side,
    })
}

/// Crop to the centered square whose side is the shorter image side.
pub fn crop_to_square(image: &RgbaImage) -> Result<RgbaImage> {
    let r = square_region(image.width(), image.height())?;
    if r.side == image.width() && r.side == image.height() {
        return Ok(image.clone());
    }
    Ok(imageops::crop_imm(image, r.left, r.top, r.side, r.side).to_image())
}
