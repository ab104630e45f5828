use std::path::{Path, PathBuf};

use anyhow::Context;
use app_core::requests::open_rgba;
use app_core::{
    subtract_mask, EditorCanvas, MergeParams, MergeRequest, ProcessRequest, Report,
    SubtractRequest, Workspace,
};
use clap::{Args, Parser, Subcommand};
use image::DynamicImage;
use render::{crop_to_square, rasterize, EditorOutput};
use storage::outputs::{save_png_to_path, stem_of};
use storage::settings::{self, MaskResampleSetting, MergeFilterSetting, Settings};

/// Paint-a-mask, cut out, and merge tile images.
#[derive(Debug, Parser)]
#[command(name = "maskmerge", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Settings file (defaults to the platform data directory).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Directory for generated artifacts; overrides settings and MASKMERGE_OUTPUT_DIR.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Print a JSON report instead of the status line.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the square painting canvas preview of an image.
    Canvas {
        image: PathBuf,
        /// Output path (default: `<output_dir>/<name>-canvas.png`).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Canvas side in pixels (default from settings).
        #[arg(long)]
        size: Option<u32>,
        /// Also write a transparent layer of canvas size to paint on.
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
    /// Crop an image to its centered square.
    Crop { image: PathBuf, out: PathBuf },
    /// Rasterize a painted overlay into a binary mask.
    Mask {
        overlay: PathBuf,
        out: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Cut an image out with a painted overlay and save mask + cutout.
    Process {
        image: PathBuf,
        /// Overlay layers; only the first is used for the mask.
        #[arg(required = true)]
        overlays: Vec<PathBuf>,
    },
    /// Paste a cutout onto a background.
    Merge {
        processed: PathBuf,
        background: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        x: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        y: i64,
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        /// Stem for the `-merged.png` artifact.
        #[arg(long)]
        name: Option<String>,
    },
    /// Keep only the pixels of an image where a mask file is fully opaque.
    Subtract {
        original: PathBuf,
        mask: PathBuf,
        out: PathBuf,
    },
    /// Show or change the saved settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective settings file as JSON.
    Show,
    /// Update one or more settings and save them.
    Set(SetArgs),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = true)]
struct SetArgs {
    /// Directory generated artifacts are written to.
    #[arg(long)]
    artifacts: Option<PathBuf>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    editor_size: Option<u32>,
    /// `nearest` or `smooth_threshold`.
    #[arg(long)]
    mask_resample: Option<MaskResampleSetting>,
    /// `nearest`, `triangle`, `catmull_rom`, `gaussian` or `lanczos3`.
    #[arg(long)]
    merge_filter: Option<MergeFilterSetting>,
}

impl SetArgs {
    fn apply(self, s: &mut Settings) {
        if let Some(dir) = self.artifacts {
            s.output_dir = Some(dir);
        }
        if let Some(size) = self.editor_size {
            s.editor_size = size;
        }
        if let Some(policy) = self.mask_resample {
            s.mask_resample = policy;
        }
        if let Some(filter) = self.merge_filter {
            s.merge_filter = filter;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let Cli { global, command } = Cli::parse();

    match command {
        Command::Canvas {
            image,
            out,
            size,
            overlay,
        } => cmd_canvas(&workspace(&global)?, &image, out, size, overlay, global.json),
        Command::Crop { image, out } => cmd_crop(&image, &out, global.json),
        Command::Mask {
            overlay,
            out,
            width,
            height,
        } => cmd_mask(&workspace(&global)?, &overlay, &out, (width, height), global.json),
        Command::Process { image, overlays } => {
            cmd_process(&workspace(&global)?, image, &overlays, global.json)
        }
        Command::Merge {
            processed,
            background,
            x,
            y,
            scale,
            name,
        } => {
            let req = MergeRequest {
                processed: Some(processed.into()),
                background: Some(background.into()),
                params: MergeParams { x, y, scale },
                name,
            };
            let resp = workspace(&global)?.merge(&req);
            finish(&Report::from(&resp), global.json)
        }
        Command::Subtract {
            original,
            mask,
            out,
        } => {
            let saved = subtract_mask(&SubtractRequest {
                original,
                mask,
                output: out,
            })?;
            report_saved(&saved, "Subtracted image saved as", global.json)
        }
        Command::Config { action } => cmd_config(&global, action),
    }
}

fn workspace(global: &GlobalArgs) -> anyhow::Result<Workspace> {
    let settings = match &global.settings {
        Some(path) => settings::load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => settings::load_or_default(),
    };
    Ok(match &global.output_dir {
        Some(dir) => Workspace::with_output_dir(settings, dir),
        None => Workspace::new(settings),
    })
}

fn cmd_canvas(
    ws: &Workspace,
    image: &Path,
    out: Option<PathBuf>,
    size: Option<u32>,
    overlay: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let canvas = match size {
        Some(size) => EditorCanvas::open(image, size)?,
        None => ws.open_canvas(image)?,
    };
    let out = out.unwrap_or_else(|| {
        ws.outputs()
            .root()
            .join(format!("{}-canvas.png", stem_of(image)))
    });
    let side = canvas.size();

    let mut saved = Vec::new();
    if let Some(overlay) = overlay {
        save_png_to_path(&DynamicImage::ImageRgba8(canvas.blank_overlay()), &overlay)?;
        saved.push(overlay);
    }
    save_png_to_path(&DynamicImage::ImageRgba8(canvas.preview), &out)?;
    saved.insert(0, out);

    let report = Report {
        ok: true,
        status: format!("Canvas ({side}x{side}) saved as {}", saved[0].display()),
        saved,
        origin: None,
        scaled_size: None,
    };
    finish(&report, json)
}

fn cmd_crop(image: &Path, out: &Path, json: bool) -> anyhow::Result<()> {
    let img = open_rgba(image)?;
    let cropped = crop_to_square(&img)?;
    save_png_to_path(&DynamicImage::ImageRgba8(cropped), out)?;
    report_saved(out, "Cropped image saved as", json)
}

fn cmd_mask(
    ws: &Workspace,
    overlay: &Path,
    out: &Path,
    target: (u32, u32),
    json: bool,
) -> anyhow::Result<()> {
    let layer = open_rgba(overlay)?;
    let mask = rasterize(&layer, target, ws.mask_resample())?;
    save_png_to_path(&DynamicImage::ImageLuma8(mask.into_gray()), out)?;
    report_saved(out, "Mask saved as", json)
}

fn cmd_process(ws: &Workspace, image: PathBuf, overlays: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let layers = overlays
        .iter()
        .map(|p| open_rgba(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let resp = ws.process(&ProcessRequest {
        image: Some(image),
        editor: Some(EditorOutput { layers }),
    });
    finish(&Report::from(&resp), json)
}

fn cmd_config(global: &GlobalArgs, action: ConfigAction) -> anyhow::Result<()> {
    let path = match &global.settings {
        Some(p) => p.clone(),
        None => storage::paths::settings_path()?,
    };
    let mut current = settings::load_settings(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;

    if let ConfigAction::Set(args) = action {
        args.apply(&mut current);
        match &global.settings {
            Some(p) => settings::save_settings_to_path(&current, p)?,
            None => settings::save_settings(&current)?,
        }
        eprintln!("Settings saved to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&current)?);
    Ok(())
}

fn report_saved(path: &Path, label: &str, json: bool) -> anyhow::Result<()> {
    let report = Report {
        ok: true,
        status: format!("{label} {}", path.display()),
        saved: vec![path.to_path_buf()],
        origin: None,
        scaled_size: None,
    };
    finish(&report, json)
}

fn finish(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if report.ok {
        println!("{}", report.status);
    }
    if !report.ok {
        anyhow::bail!("{}", report.status);
    }
    Ok(())
}
