use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::error::{CompositeError, Result};
use crate::mask::Mask;

/// Replace the alpha channel of `image` with `mask`. Color data is untouched.
///
/// A mask of a different size is resized (nearest-neighbor) to the image first,
/// so the output always has the image's dimensions.
pub fn apply_alpha(image: &RgbaImage, mask: &Mask) -> RgbaImage {
    let (w, h) = image.dimensions();
    let resized;
    let mask = if mask.dimensions() != (w, h) {
        debug!(mask = ?mask.dimensions(), image = ?(w, h), "resizing mask to image");
        resized = mask.resized(w, h);
        &resized
    } else {
        mask
    };

    let mut out = image.clone();
    for (px, m) in out.pixels_mut().zip(mask.as_gray().pixels()) {
        px.0[3] = m.0[0];
    }
    out
}

/// Keep only the pixels where `mask` is fully opaque; everything else becomes
/// transparent. Kept pixels retain their own alpha.
///
/// The mask is an RGBA image (typically a saved `-mask.png` converted to RGBA).
/// When sizes differ the original is resampled to the mask's size.
pub fn keep_opaque(original: &RgbaImage, mask: &RgbaImage) -> Result<RgbaImage> {
    let (mw, mh) = mask.dimensions();
    if mw == 0 || mh == 0 {
        return Err(CompositeError::EmptyLayer {
            width: mw,
            height: mh,
        });
    }
    let (ow, oh) = original.dimensions();
    if ow == 0 || oh == 0 {
        return Err(CompositeError::EmptyImage {
            width: ow,
            height: oh,
        });
    }

    let mut out = if (ow, oh) != (mw, mh) {
        debug!(original = ?(ow, oh), mask = ?(mw, mh), "resizing original to mask");
        imageops::resize(original, mw, mh, FilterType::Lanczos3)
    } else {
        original.clone()
    };

    for (px, m) in out.pixels_mut().zip(mask.pixels()) {
        if m.0[3] != 255 {
            px.0[3] = 0;
        }
    }
    Ok(out)
}
