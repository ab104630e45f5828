use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use render::CompositeError;

use crate::requests::open_rgba;

/// A source image prepared for painting on a fixed-size square canvas.
#[derive(Debug, Clone)]
pub struct EditorCanvas {
    /// The source squashed to `size x size` for display under the brush.
    pub preview: RgbaImage,
    pub original_size: (u32, u32),
}

impl EditorCanvas {
    pub fn from_image(image: &RgbaImage, size: u32) -> Result<Self, CompositeError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(CompositeError::EmptyImage {
                width: w,
                height: h,
            });
        }
        if size == 0 {
            return Err(CompositeError::InvalidTarget {
                width: size,
                height: size,
            });
        }
        Ok(Self {
            preview: imageops::resize(image, size, size, FilterType::Lanczos3),
            original_size: (w, h),
        })
    }

    pub fn open(path: &Path, size: u32) -> anyhow::Result<Self> {
        let image = open_rgba(path)?;
        Ok(Self::from_image(&image, size)?)
    }

    pub fn size(&self) -> u32 {
        self.preview.width()
    }

    /// A fully transparent layer to paint on.
    pub fn blank_overlay(&self) -> RgbaImage {
        RgbaImage::new(self.preview.width(), self.preview.height())
    }
}
