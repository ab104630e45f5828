use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::error::{ensure_non_empty, CompositeError, Result};

/// Upper bound on the pixel count of a scaled cutout (256 MiB of RGBA).
pub const MAX_SCALED_PIXELS: u64 = 1 << 26;

/// Where and how large a cutout lands on a background.
///
/// `x`/`y` are in background pixels and may be out of range; they are clamped
/// at merge time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn new(x: i64, y: i64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(CompositeError::InvalidScale(self.scale));
        }
        Ok(())
    }

    /// `floor(w * scale) x floor(h * scale)`.
    pub fn scaled_size(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        self.validate()?;
        let sw = (width as f64 * self.scale).floor();
        let sh = (height as f64 * self.scale).floor();
        if sw < 1.0 || sh < 1.0 {
            return Err(CompositeError::ScaledToNothing {
                width,
                height,
                scale: self.scale,
            });
        }
        if sw * sh > MAX_SCALED_PIXELS as f64 {
            return Err(CompositeError::ScaleTooLarge {
                width,
                height,
                scale: self.scale,
                limit: MAX_SCALED_PIXELS,
            });
        }
        Ok((sw as u32, sh as u32))
    }
}

/// Result of a merge, with the geometry that was actually used.
#[derive(Debug, Clone)]
pub struct Merged {
    pub image: RgbaImage,
    pub origin: (u32, u32),
    pub scaled_size: (u32, u32),
}

/// Clamp `offset` into `[0, outer - inner]`, or 0 when `inner` does not fit.
pub fn clamp_offset(offset: i64, outer: u32, inner: u32) -> u32 {
    let max = (outer as i64 - inner as i64).max(0);
    offset.clamp(0, max) as u32
}

/// Scale `cutout` with Lanczos3 and paste it onto a copy of `background`.
pub fn merge(cutout: &RgbaImage, background: &RgbaImage, placement: Placement) -> Result<Merged> {
    merge_with_filter(cutout, background, placement, FilterType::Lanczos3)
}

pub fn merge_with_filter(
    cutout: &RgbaImage,
    background: &RgbaImage,
    placement: Placement,
    filter: FilterType,
) -> Result<Merged> {
    placement.validate()?;
    ensure_non_empty(cutout.width(), cutout.height())?;
    ensure_non_empty(background.width(), background.height())?;

    let (sw, sh) = placement.scaled_size(cutout.width(), cutout.height())?;
    let scaled = if (sw, sh) == cutout.dimensions() {
        cutout.clone()
    } else {
        imageops::resize(cutout, sw, sh, filter)
    };

    let origin = (
        clamp_offset(placement.x, background.width(), sw),
        clamp_offset(placement.y, background.height(), sh),
    );
    debug!(
        requested = ?(placement.x, placement.y),
        ?origin,
        scaled = ?(sw, sh),
        background = ?background.dimensions(),
        "pasting cutout"
    );

    let mut image = background.clone();
    paste_with_mask(&mut image, &scaled, origin.0, origin.1);

    Ok(Merged {
        image,
        origin,
        scaled_size: (sw, sh),
    })
}

/// Paste `src` at (`ox`, `oy`) using its own alpha as the paste mask.
///
/// Alpha 0 leaves `dst` alone, 255 replaces it, anything in between
/// interpolates all four channels. Pixels past the edges of `dst` are clipped.
fn paste_with_mask(dst: &mut RgbaImage, src: &RgbaImage, ox: u32, oy: u32) {
    let (dw, dh) = dst.dimensions();
    for (sx, sy, spx) in src.enumerate_pixels() {
        let (Some(dx), Some(dy)) = (ox.checked_add(sx), oy.checked_add(sy)) else {
            continue;
        };
        if dx >= dw || dy >= dh {
            continue;
        }

        let sa = spx.0[3] as u16;
        if sa == 0 {
            continue;
        }
        let dp = dst.get_pixel_mut(dx, dy);
        if sa == 255 {
            *dp = *spx;
            continue;
        }

        let inv_sa = 255 - sa;
        for c in 0..4 {
            dp.0[c] = blend_channel(spx.0[c], dp.0[c], sa, inv_sa);
        }
    }
}

fn blend_channel(src: u8, dst: u8, sa: u16, inv_sa: u16) -> u8 {
    let s = src as u16;
    let d = dst as u16;
    ((s * sa + d * inv_sa + 127) / 255) as u8
}
