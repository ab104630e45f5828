use std::path::Path;

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;

fn maskmerge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("maskmerge").unwrap();
    cmd.current_dir(dir)
        .env_remove("MASKMERGE_OUTPUT_DIR")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn process_then_merge_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    RgbaImage::from_pixel(64, 96, Rgba([200, 10, 10, 255]))
        .save(dir.path().join("hut.png"))
        .unwrap();
    RgbaImage::from_pixel(512, 512, Rgba([255, 255, 255, 255]))
        .save(dir.path().join("paint.png"))
        .unwrap();
    RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255]))
        .save(dir.path().join("bg.png"))
        .unwrap();

    maskmerge(dir.path())
        .args(["--output-dir", "out", "process", "hut.png", "paint.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed image saved as"));
    assert!(out.join("hut-mask.png").exists());
    assert!(out.join("hut-processed.png").exists());

    let output = maskmerge(dir.path())
        .args([
            "--output-dir",
            "out",
            "--json",
            "merge",
            "out/hut-processed.png",
            "bg.png",
            "--x",
            "200",
            "--y",
            "-5",
            "--scale",
            "0.5",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["origin"], serde_json::json!([68, 0]));
    assert_eq!(report["scaled_size"], serde_json::json!([32, 32]));

    let merged = image::open(out.join("hut-merged.png")).unwrap().to_rgba8();
    assert_eq!(merged.dimensions(), (100, 100));
    assert_eq!(merged.get_pixel(0, 99).0, [0, 0, 255, 255]);
}

#[test]
fn crop_and_mask_commands() {
    let dir = tempfile::tempdir().unwrap();
    RgbaImage::new(100, 200).save(dir.path().join("tall.png")).unwrap();
    RgbaImage::from_pixel(512, 512, Rgba([1, 1, 1, 255]))
        .save(dir.path().join("overlay.png"))
        .unwrap();

    maskmerge(dir.path())
        .args(["crop", "tall.png", "square.png"])
        .assert()
        .success();
    let square = image::open(dir.path().join("square.png")).unwrap();
    assert_eq!((square.width(), square.height()), (100, 100));

    maskmerge(dir.path())
        .args(["mask", "overlay.png", "mask.png", "--width", "300", "--height", "400"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mask saved as"));
    let mask = image::open(dir.path().join("mask.png")).unwrap().to_luma8();
    assert_eq!(mask.dimensions(), (300, 400));
    assert!(mask.pixels().all(|p| p.0[0] == 255));
}

#[test]
fn merge_with_missing_background_fails_with_status() {
    let dir = tempfile::tempdir().unwrap();
    RgbaImage::new(4, 4).save(dir.path().join("cut.png")).unwrap();

    maskmerge(dir.path())
        .args(["--output-dir", "out", "merge", "cut.png", "nope.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("An error occurred during merging"));
}

#[test]
fn process_fails_when_cutout_cannot_be_written() {
    let dir = tempfile::tempdir().unwrap();
    RgbaImage::from_pixel(32, 32, Rgba([9, 9, 9, 255]))
        .save(dir.path().join("hut.png"))
        .unwrap();
    RgbaImage::from_pixel(512, 512, Rgba([255, 255, 255, 255]))
        .save(dir.path().join("paint.png"))
        .unwrap();
    std::fs::create_dir_all(dir.path().join("out").join("hut-processed.png")).unwrap();

    maskmerge(dir.path())
        .args(["--output-dir", "out", "process", "hut.png", "paint.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processed image could not be saved"));
    assert!(!dir.path().join("out").join("hut-mask.png").exists());
}

#[test]
fn config_set_persists_and_drives_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("conf").join("settings.json");
    let settings_arg = settings.to_str().unwrap();

    maskmerge(dir.path())
        .args([
            "--settings",
            settings_arg,
            "config",
            "set",
            "--editor-size",
            "64",
            "--mask-resample",
            "smooth_threshold",
            "--artifacts",
            "tiles",
        ])
        .assert()
        .success();
    assert!(settings.exists());

    let output = maskmerge(dir.path())
        .args(["--settings", settings_arg, "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["editor_size"], 64);
    assert_eq!(shown["mask_resample"], "smooth_threshold");
    assert_eq!(shown["merge_filter"], "lanczos3");
    assert_eq!(shown["output_dir"], "tiles");

    RgbaImage::new(300, 200).save(dir.path().join("src.png")).unwrap();
    maskmerge(dir.path())
        .args([
            "--settings",
            settings_arg,
            "canvas",
            "src.png",
            "--overlay",
            "layer.png",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Canvas (64x64) saved as"));
    let preview = image::open(dir.path().join("tiles").join("src-canvas.png")).unwrap();
    assert_eq!((preview.width(), preview.height()), (64, 64));
    let layer = image::open(dir.path().join("layer.png")).unwrap().to_rgba8();
    assert_eq!(layer.dimensions(), (64, 64));
    assert!(layer.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn config_set_rejects_unknown_filter() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");

    maskmerge(dir.path())
        .args([
            "--settings",
            settings.to_str().unwrap(),
            "config",
            "set",
            "--merge-filter",
            "bicubic",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown merge filter: bicubic"));
    assert!(!settings.exists());
}
