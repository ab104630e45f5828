use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};
use tracing::debug;

use crate::error::{CompositeError, Result};

const INCLUDE: u8 = 255;
const EXCLUDE: u8 = 0;

/// A single-channel mask whose values are always 0 (exclude) or 255 (include).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(GrayImage);

impl Mask {
    /// Threshold an overlay's alpha channel: any painted pixel is included.
    pub fn from_alpha(overlay: &RgbaImage) -> Self {
        let (w, h) = overlay.dimensions();
        Self(GrayImage::from_fn(w, h, |x, y| {
            Luma([binarize(overlay.get_pixel(x, y).0[3])])
        }))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Number of included pixels.
    pub fn coverage(&self) -> usize {
        self.0.pixels().filter(|p| p.0[0] == INCLUDE).count()
    }

    /// Nearest-neighbor resize; stays binary.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Self(imageops::resize(&self.0, width, height, FilterType::Nearest))
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_gray(self) -> GrayImage {
        self.0
    }
}

#[cfg(test)]
impl Mask {
    /// Threshold an arbitrary gray image (non-zero -> include).
    pub(crate) fn from_luma(gray: &GrayImage) -> Self {
        let mut out = gray.clone();
        for px in out.pixels_mut() {
            px.0[0] = binarize(px.0[0]);
        }
        Self(out)
    }

    pub(crate) fn filled(width: u32, height: u32, include: bool) -> Self {
        let v = if include { INCLUDE } else { EXCLUDE };
        Self(GrayImage::from_pixel(width, height, Luma([v])))
    }

    pub(crate) fn is_included(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == INCLUDE
    }
}

/// How a thresholded overlay is brought to the target resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaskResample {
    /// Nearest-neighbor. Exactly preserves the binary values.
    #[default]
    Nearest,
    /// Triangle filter followed by a second threshold at the midpoint.
    /// Softens stair-stepping on large upscales; the result is still binary.
    SmoothThreshold,
}

/// What the painting canvas hands back: one or more RGBA annotation layers.
/// Only the first layer is rasterized.
#[derive(Debug, Clone, Default)]
pub struct EditorOutput {
    pub layers: Vec<RgbaImage>,
}

impl EditorOutput {
    pub fn single(layer: RgbaImage) -> Self {
        Self {
            layers: vec![layer],
        }
    }
}

/// Turn a painted overlay into a binary mask of `target` size.
pub fn rasterize(overlay: &RgbaImage, target: (u32, u32), policy: MaskResample) -> Result<Mask> {
    let (ow, oh) = overlay.dimensions();
    if ow == 0 || oh == 0 {
        return Err(CompositeError::EmptyLayer {
            width: ow,
            height: oh,
        });
    }
    let (tw, th) = target;
    if tw == 0 || th == 0 {
        return Err(CompositeError::InvalidTarget {
            width: tw,
            height: th,
        });
    }

    let thresholded = Mask::from_alpha(overlay);
    debug!(
        overlay = ?(ow, oh),
        target = ?(tw, th),
        ?policy,
        included = thresholded.coverage(),
        "rasterizing overlay"
    );

    if (ow, oh) == target {
        return Ok(thresholded);
    }

    let mask = match policy {
        MaskResample::Nearest => thresholded.resized(tw, th),
        MaskResample::SmoothThreshold => {
            let mut smooth = imageops::resize(thresholded.as_gray(), tw, th, FilterType::Triangle);
            for px in smooth.pixels_mut() {
                px.0[0] = if px.0[0] >= 128 { INCLUDE } else { EXCLUDE };
            }
            Mask(smooth)
        }
    };
    Ok(mask)
}

/// Rasterize the first layer of an editor output.
///
/// `None` and an output without layers are both "no mask produced".
pub fn rasterize_editor_output(
    output: Option<&EditorOutput>,
    target: (u32, u32),
    policy: MaskResample,
) -> Result<Mask> {
    let output = output.ok_or(CompositeError::MissingInput("overlay"))?;
    let layer = output.layers.first().ok_or(CompositeError::NoLayers)?;
    rasterize(layer, target, policy)
}

fn binarize(v: u8) -> u8 {
    if v > 0 {
        INCLUDE
    } else {
        EXCLUDE
    }
}
