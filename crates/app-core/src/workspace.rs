use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use render::MaskResample;
use storage::outputs::OutputDir;
use storage::settings::{MaskResampleSetting, MergeFilterSetting, Settings};

use crate::editor::EditorCanvas;

/// Settings plus the output directory, passed explicitly to every handler.
#[derive(Debug, Clone)]
pub struct Workspace {
    settings: Settings,
    outputs: OutputDir,
}

impl Workspace {
    pub fn new(settings: Settings) -> Self {
        let outputs = OutputDir::new(settings.resolve_output_dir());
        Self { settings, outputs }
    }

    /// Like `new`, but writing artifacts to `dir` regardless of settings.
    pub fn with_output_dir(settings: Settings, dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            outputs: OutputDir::new(dir),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn outputs(&self) -> &OutputDir {
        &self.outputs
    }

    pub fn mask_resample(&self) -> MaskResample {
        match self.settings.mask_resample {
            MaskResampleSetting::Nearest => MaskResample::Nearest,
            MaskResampleSetting::SmoothThreshold => MaskResample::SmoothThreshold,
        }
    }

    pub fn merge_filter(&self) -> FilterType {
        match self.settings.merge_filter {
            MergeFilterSetting::Nearest => FilterType::Nearest,
            MergeFilterSetting::Triangle => FilterType::Triangle,
            MergeFilterSetting::CatmullRom => FilterType::CatmullRom,
            MergeFilterSetting::Gaussian => FilterType::Gaussian,
            MergeFilterSetting::Lanczos3 => FilterType::Lanczos3,
        }
    }

    pub fn open_canvas(&self, path: &Path) -> anyhow::Result<EditorCanvas> {
        EditorCanvas::open(path, self.settings.editor_size)
    }
}
