use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use render::{apply_alpha, crop_to_square, keep_opaque, merge_with_filter, rasterize_editor_output, Mask};
use storage::outputs::{save_png_to_path, stem_of, ArtifactKind};
use tracing::{info, warn};

use crate::requests::{
    open_rgba, ImageSource, MergeRequest, MergeResponse, ProcessRequest, ProcessResponse,
    SubtractRequest, MASK_FAILED_STATUS, MERGE_MISSING_STATUS, NO_INPUT_STATUS,
};
use crate::workspace::Workspace;

impl Workspace {
    /// Crop the source to square, rasterize the first overlay layer at that
    /// size, cut the source out with it and persist mask and cutout.
    pub fn process(&self, req: &ProcessRequest) -> ProcessResponse {
        let (Some(path), Some(editor)) = (req.image.as_deref(), req.editor.as_ref()) else {
            return ProcessResponse::failed(NO_INPUT_STATUS);
        };

        let source = match load_square(path) {
            Ok(img) => img,
            Err(e) => {
                warn!("failed to load {}: {e:#}", path.display());
                return ProcessResponse::failed(format!("Failed to load image: {e:#}"));
            }
        };

        let mask = match rasterize_editor_output(Some(editor), source.dimensions(), self.mask_resample()) {
            Ok(m) => m,
            Err(e) => {
                warn!("mask generation failed: {e}");
                return ProcessResponse::failed(MASK_FAILED_STATUS);
            }
        };

        let processed = apply_alpha(&source, &mask);
        let stem = stem_of(path);

        let (status, saved, persisted) = match self.save_process_artifacts(&stem, &mask, &processed) {
            Ok((mask_path, processed_path)) => (
                format!("Processed image saved as {}", processed_path.display()),
                vec![mask_path, processed_path],
                true,
            ),
            Err(e) => {
                warn!("failed to save artifacts for {stem}: {e:#}");
                (format!("Processed image could not be saved: {e:#}"), vec![], false)
            }
        };

        ProcessResponse {
            status,
            mask: Some(mask),
            processed: Some(processed),
            saved,
            persisted,
        }
    }

    /// Scale the processed cutout, paste it onto the background at the
    /// clamped offset and persist the merge.
    pub fn merge(&self, req: &MergeRequest) -> MergeResponse {
        let (Some(processed), Some(background)) = (req.processed.as_ref(), req.background.as_ref()) else {
            return MergeResponse::failed(MERGE_MISSING_STATUS);
        };

        match self.try_merge(processed, background, req) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("merge failed: {e:#}");
                MergeResponse::failed(format!("An error occurred during merging: {e:#}"))
            }
        }
    }

    fn try_merge(
        &self,
        processed: &ImageSource,
        background: &ImageSource,
        req: &MergeRequest,
    ) -> anyhow::Result<MergeResponse> {
        let cutout = processed.load()?;
        let background = background.load()?;

        let merged = merge_with_filter(&cutout, &background, req.params.placement(), self.merge_filter())?;

        let image = DynamicImage::ImageRgba8(merged.image);
        let saved = self
            .outputs()
            .save_png(&image, &req.artifact_stem(), ArtifactKind::Merged)?;

        Ok(MergeResponse {
            status: format!("Merged image saved as {}", saved.display()),
            merged: Some(image.into_rgba8()),
            origin: Some(merged.origin),
            scaled_size: Some(merged.scaled_size),
            saved: Some(saved),
        })
    }

    fn save_process_artifacts(
        &self,
        stem: &str,
        mask: &Mask,
        processed: &RgbaImage,
    ) -> anyhow::Result<(PathBuf, PathBuf)> {
        let outputs = self.outputs();
        let mask_path = outputs.save_png(
            &DynamicImage::ImageLuma8(mask.as_gray().clone()),
            stem,
            ArtifactKind::Mask,
        )?;
        let processed_path = match outputs.save_png(
            &DynamicImage::ImageRgba8(processed.clone()),
            stem,
            ArtifactKind::Processed,
        ) {
            Ok(p) => p,
            Err(e) => {
                // A lone mask without its cutout is not a usable result.
                if let Err(rm) = fs::remove_file(&mask_path) {
                    warn!("failed to remove {}: {rm}", mask_path.display());
                }
                return Err(e);
            }
        };
        Ok((mask_path, processed_path))
    }
}

/// Keep the pixels of `original` where the mask file is fully opaque and write
/// the result as PNG to `output`.
pub fn subtract_mask(req: &SubtractRequest) -> anyhow::Result<PathBuf> {
    let original = open_rgba(&req.original)?;
    let mask = open_rgba(&req.mask)?;
    let out = keep_opaque(&original, &mask)?;
    save_png_to_path(&DynamicImage::ImageRgba8(out), &req.output)?;
    info!(path = %req.output.display(), "saved subtracted image");
    Ok(req.output.clone())
}

fn load_square(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = open_rgba(path)?;
    Ok(crop_to_square(&img)?)
}
