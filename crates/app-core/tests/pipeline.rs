use std::path::Path;

use app_core::requests::{MASK_FAILED_STATUS, MERGE_MISSING_STATUS, NO_INPUT_STATUS};
use app_core::{
    subtract_mask, ImageSource, MergeParams, MergeRequest, ProcessRequest, SubtractRequest,
    Workspace,
};
use image::{Rgba, RgbaImage};
use render::EditorOutput;
use storage::settings::{MaskResampleSetting, Settings};

fn write_png(path: &Path, img: &RgbaImage) {
    img.save(path).unwrap();
}

fn workspace(dir: &Path) -> Workspace {
    Workspace::with_output_dir(Settings::default(), dir.join("outputs"))
}

/// 512x512 overlay with the left half painted.
fn left_half_overlay() -> EditorOutput {
    EditorOutput::single(RgbaImage::from_fn(512, 512, |x, _| {
        if x < 256 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

#[test]
fn process_crops_masks_and_saves_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("tower.png");
    write_png(&src, &RgbaImage::from_pixel(120, 80, Rgba([10, 200, 30, 255])));

    let ws = workspace(dir.path());
    let resp = ws.process(&ProcessRequest {
        image: Some(src),
        editor: Some(left_half_overlay()),
    });

    assert!(resp.is_ok(), "{}", resp.status);
    let processed = resp.processed.as_ref().unwrap();
    assert_eq!(processed.dimensions(), (80, 80));
    assert_eq!(processed.get_pixel(0, 0).0, [10, 200, 30, 255]);
    assert_eq!(processed.get_pixel(79, 79).0, [10, 200, 30, 0]);

    let mask_path = dir.path().join("outputs").join("tower-mask.png");
    let processed_path = dir.path().join("outputs").join("tower-processed.png");
    assert_eq!(resp.saved, vec![mask_path.clone(), processed_path.clone()]);
    assert_eq!(
        resp.status,
        format!("Processed image saved as {}", processed_path.display())
    );

    let mask = image::open(&mask_path).unwrap().to_luma8();
    assert_eq!(mask.dimensions(), (80, 80));
    assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

#[test]
fn process_with_unwritable_cutout_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("tower.png");
    write_png(&src, &RgbaImage::from_pixel(40, 40, Rgba([5, 5, 5, 255])));
    let outputs = dir.path().join("outputs");
    std::fs::create_dir_all(outputs.join("tower-processed.png")).unwrap();

    let resp = workspace(dir.path()).process(&ProcessRequest {
        image: Some(src),
        editor: Some(left_half_overlay()),
    });

    assert!(!resp.is_ok());
    assert!(!resp.persisted);
    assert!(resp.saved.is_empty());
    assert!(resp.status.starts_with("Processed image could not be saved"));
    assert!(!outputs.join("tower-mask.png").exists());
    assert!(!outputs.join("tower-processed.png.tmp").exists());
    assert!(!app_core::Report::from(&resp).ok);
}

#[test]
fn process_with_smooth_resampling_keeps_cutout_binary() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("keep.png");
    write_png(&src, &RgbaImage::from_pixel(700, 700, Rgba([90, 60, 30, 255])));

    let settings = Settings {
        mask_resample: MaskResampleSetting::SmoothThreshold,
        ..Settings::default()
    };
    let ws = Workspace::with_output_dir(settings, dir.path().join("outputs"));
    let resp = ws.process(&ProcessRequest {
        image: Some(src),
        editor: Some(left_half_overlay()),
    });

    assert!(resp.is_ok(), "{}", resp.status);
    let processed = resp.processed.unwrap();
    assert_eq!(processed.dimensions(), (700, 700));
    assert!(processed.pixels().all(|p| p.0[3] == 0 || p.0[3] == 255));
    assert_eq!(processed.get_pixel(0, 350).0[3], 255);
    assert_eq!(processed.get_pixel(699, 350).0[3], 0);

    let mask = resp.mask.unwrap();
    assert_eq!(mask.dimensions(), (700, 700));
    assert!(mask.as_gray().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

#[test]
fn process_reports_missing_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());

    let resp = ws.process(&ProcessRequest {
        image: None,
        editor: Some(left_half_overlay()),
    });
    assert!(!resp.is_ok());
    assert_eq!(resp.status, NO_INPUT_STATUS);
    assert!(!dir.path().join("outputs").exists());
}

#[test]
fn process_reports_malformed_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.png");
    write_png(&src, &RgbaImage::new(10, 10));

    let resp = workspace(dir.path()).process(&ProcessRequest {
        image: Some(src),
        editor: Some(EditorOutput::default()),
    });
    assert_eq!(resp.status, MASK_FAILED_STATUS);
    assert!(resp.mask.is_none());
}

#[test]
fn merge_clamps_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let bg_path = dir.path().join("field.png");
    write_png(&bg_path, &RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255])));

    let ws = workspace(dir.path());
    let resp = ws.merge(&MergeRequest {
        processed: Some(ImageSource::Buffer(RgbaImage::from_pixel(
            50,
            50,
            Rgba([255, 0, 0, 255]),
        ))),
        background: Some(bg_path.into()),
        params: MergeParams {
            x: 200,
            y: 200,
            scale: 1.0,
        },
        name: None,
    });

    assert!(resp.is_ok(), "{}", resp.status);
    assert_eq!(resp.origin, Some((50, 50)));
    let merged = resp.merged.unwrap();
    assert_eq!(merged.dimensions(), (100, 100));
    assert_eq!(merged.get_pixel(75, 75).0, [255, 0, 0, 255]);
    assert_eq!(merged.get_pixel(10, 10).0, [0, 0, 255, 255]);
    assert_eq!(
        resp.saved,
        Some(dir.path().join("outputs").join("field-merged.png"))
    );
}

#[test]
fn merge_reports_missing_and_invalid_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());

    let resp = ws.merge(&MergeRequest {
        processed: Some(RgbaImage::new(4, 4).into()),
        ..MergeRequest::default()
    });
    assert_eq!(resp.status, MERGE_MISSING_STATUS);

    let resp = ws.merge(&MergeRequest {
        processed: Some(RgbaImage::new(4, 4).into()),
        background: Some(RgbaImage::new(8, 8).into()),
        params: MergeParams {
            x: 0,
            y: 0,
            scale: 0.0,
        },
        name: None,
    });
    assert!(!resp.is_ok());
    assert!(resp.status.starts_with("An error occurred during merging:"));
}

#[test]
fn subtract_keeps_only_fully_opaque_mask_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("original.png");
    let mask = dir.path().join("mask.png");
    let output = dir.path().join("out").join("output.png");

    write_png(&original, &RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
    let mut m = RgbaImage::new(4, 4);
    m.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
    write_png(&mask, &m);

    let saved = subtract_mask(&SubtractRequest {
        original,
        mask,
        output: output.clone(),
    })
    .unwrap();
    assert_eq!(saved, output);

    let out = image::open(&output).unwrap().to_rgba8();
    assert_eq!(out.get_pixel(0, 0).0, [1, 2, 3, 255]);
    assert_eq!(out.get_pixel(3, 3).0[3], 0);
}

#[test]
fn canvas_uses_configured_editor_size() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.png");
    write_png(&src, &RgbaImage::new(300, 200));

    let settings = Settings {
        editor_size: 128,
        ..Settings::default()
    };
    let ws = Workspace::with_output_dir(settings, dir.path());
    let canvas = ws.open_canvas(&src).unwrap();
    assert_eq!(canvas.size(), 128);
    assert_eq!(canvas.original_size, (300, 200));
}
