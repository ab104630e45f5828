use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::atomic;

/// Fallback file stem when a source has no usable name.
pub const UNNAMED_STEM: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Mask,
    Processed,
    Merged,
}

impl ArtifactKind {
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Mask => "mask",
            ArtifactKind::Processed => "processed",
            ArtifactKind::Merged => "merged",
        }
    }
}

/// The directory artifacts are written to.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<stem>-<suffix>.png`
    pub fn artifact_path(&self, stem: &str, kind: ArtifactKind) -> PathBuf {
        self.root.join(format!("{stem}-{}.png", kind.suffix()))
    }

    /// Encode `image` as PNG and write it as the `kind` artifact for `stem`.
    pub fn save_png(
        &self,
        image: &DynamicImage,
        stem: &str,
        kind: ArtifactKind,
    ) -> anyhow::Result<PathBuf> {
        let path = self.artifact_path(stem, kind);
        save_png_to_path(image, &path)?;
        info!(path = %path.display(), "saved {} image", kind.suffix());
        Ok(path)
    }
}

/// Base name of `source` without its extension, e.g. `tiles/a.b.png` -> `a.b`.
pub fn stem_of(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNNAMED_STEM.to_string())
}

pub fn save_png_to_path(image: &DynamicImage, path: &Path) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    atomic::write_atomic(path, &buf)
}
