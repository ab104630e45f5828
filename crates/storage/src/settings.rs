use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{atomic, paths};

const SETTINGS_SCHEMA_VERSION: u32 = 1;

/// Overrides `Settings::output_dir` when set and non-empty.
pub const OUTPUT_DIR_ENV: &str = "MASKMERGE_OUTPUT_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_EDITOR_SIZE: u32 = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub version: u32,
    /// Where masks, cutouts and merges are written. Relative paths resolve
    /// against the working directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Side of the square painting canvas.
    #[serde(default = "default_editor_size")]
    pub editor_size: u32,
    #[serde(default)]
    pub mask_resample: MaskResampleSetting,
    #[serde(default)]
    pub merge_filter: MergeFilterSetting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_SCHEMA_VERSION,
            output_dir: None,
            editor_size: DEFAULT_EDITOR_SIZE,
            mask_resample: MaskResampleSetting::default(),
            merge_filter: MergeFilterSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskResampleSetting {
    #[default]
    Nearest,
    SmoothThreshold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeFilterSetting {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl FromStr for MaskResampleSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "mask resample policy")
    }
}

impl FromStr for MergeFilterSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, "merge filter")
    }
}

/// Parse a unit variant by its settings-file name.
fn parse_variant<T: DeserializeOwned>(s: &str, what: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown {what}: {s}"))
}

fn default_editor_size() -> u32 {
    DEFAULT_EDITOR_SIZE
}

impl Settings {
    /// Output directory after applying the `MASKMERGE_OUTPUT_DIR` override.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir_with_env(std::env::var_os(OUTPUT_DIR_ENV))
    }

    fn output_dir_with_env(&self, env: Option<OsString>) -> PathBuf {
        match env {
            Some(v) if !v.is_empty() => PathBuf::from(v),
            _ => self
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}

/// Load settings from `path`. A missing file yields defaults.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let mut s: Settings = serde_json::from_str(&raw)?;

    if s.version == 0 {
        // Files written before versioning carry no version field.
        s.version = 1;
    }
    if s.version != SETTINGS_SCHEMA_VERSION {
        anyhow::bail!("unsupported settings version: {}", s.version);
    }

    if s.editor_size == 0 {
        warn!("editor_size of 0 in {}, using {DEFAULT_EDITOR_SIZE}", path.display());
        s.editor_size = DEFAULT_EDITOR_SIZE;
    }

    Ok(s)
}

/// Settings from the platform data directory, or defaults if that fails.
pub fn load_or_default() -> Settings {
    let loaded = paths::settings_path().and_then(|p| load_settings(&p));
    match loaded {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to load settings, using defaults: {e}");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> anyhow::Result<()> {
    save_settings_to_path(settings, &paths::settings_path()?)
}

pub fn save_settings_to_path(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    if settings.version != SETTINGS_SCHEMA_VERSION {
        anyhow::bail!(
            "refusing to save unsupported settings version: {}",
            settings.version
        );
    }

    let mut json = serde_json::to_vec_pretty(settings)?;
    json.push(b'\n');
    atomic::write_atomic(path, &json)
}
