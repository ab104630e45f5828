use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;
use render::{EditorOutput, Mask, Placement};
use serde::{Deserialize, Serialize};
use storage::outputs::stem_of;

pub const NO_INPUT_STATUS: &str = "No image or mask to process.";
pub const MASK_FAILED_STATUS: &str = "Failed to generate mask.";
pub const MERGE_MISSING_STATUS: &str = "Processed image or background image is missing.";

/// Decode any supported image file as RGBA8.
pub fn open_rgba(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// An image handed to a handler either by path or as an already decoded buffer.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Buffer(RgbaImage),
}

impl ImageSource {
    pub fn load(&self) -> anyhow::Result<RgbaImage> {
        match self {
            ImageSource::Path(p) => open_rgba(p),
            ImageSource::Buffer(img) => Ok(img.clone()),
        }
    }

    /// File stem for path sources.
    pub fn stem(&self) -> Option<String> {
        match self {
            ImageSource::Path(p) => Some(stem_of(p)),
            ImageSource::Buffer(_) => None,
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<RgbaImage> for ImageSource {
    fn from(img: RgbaImage) -> Self {
        ImageSource::Buffer(img)
    }
}

/// Cut a source image out with a painted overlay.
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub image: Option<PathBuf>,
    pub editor: Option<EditorOutput>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessResponse {
    pub status: String,
    pub mask: Option<Mask>,
    pub processed: Option<RgbaImage>,
    /// Mask then cutout, when both were written.
    pub saved: Vec<PathBuf>,
    /// Whether the artifacts reached disk. A failed save removes whatever
    /// was written, so `saved` is then empty.
    pub persisted: bool,
}

impl ProcessResponse {
    pub(crate) fn failed(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.processed.is_some() && self.persisted
    }
}

/// Slider values for a merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeParams {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            scale: default_scale(),
        }
    }
}

impl MergeParams {
    pub fn placement(&self) -> Placement {
        Placement::new(self.x, self.y, self.scale)
    }
}

/// Paste a processed cutout onto a background.
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    pub processed: Option<ImageSource>,
    pub background: Option<ImageSource>,
    pub params: MergeParams,
    /// Stem for `<name>-merged.png`; derived from the inputs when unset.
    pub name: Option<String>,
}

impl MergeRequest {
    pub(crate) fn artifact_stem(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let from_processed = self
            .processed
            .as_ref()
            .and_then(ImageSource::stem)
            .map(|s| s.strip_suffix("-processed").map(str::to_string).unwrap_or(s));
        from_processed
            .or_else(|| self.background.as_ref().and_then(ImageSource::stem))
            .unwrap_or_else(|| storage::outputs::UNNAMED_STEM.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeResponse {
    pub status: String,
    pub merged: Option<RgbaImage>,
    pub origin: Option<(u32, u32)>,
    pub scaled_size: Option<(u32, u32)>,
    pub saved: Option<PathBuf>,
}

impl MergeResponse {
    pub(crate) fn failed(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.merged.is_some()
    }
}

/// Apply a saved RGBA mask file to an original image and write the result.
#[derive(Debug, Clone)]
pub struct SubtractRequest {
    pub original: PathBuf,
    pub mask: PathBuf,
    pub output: PathBuf,
}

/// Serializable summary of a handler response, for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub ok: bool,
    pub status: String,
    pub saved: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled_size: Option<(u32, u32)>,
}

impl From<&ProcessResponse> for Report {
    fn from(r: &ProcessResponse) -> Self {
        Self {
            ok: r.is_ok(),
            status: r.status.clone(),
            saved: r.saved.clone(),
            origin: None,
            scaled_size: None,
        }
    }
}

impl From<&MergeResponse> for Report {
    fn from(r: &MergeResponse) -> Self {
        Self {
            ok: r.is_ok(),
            status: r.status.clone(),
            saved: r.saved.iter().cloned().collect(),
            origin: r.origin,
            scaled_size: r.scaled_size,
        }
    }
}
