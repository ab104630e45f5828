/// Failures of the pure compositing operations.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),
    #[error("image has zero dimensions ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("overlay has no layers")]
    NoLayers,
    #[error("overlay layer has zero dimensions ({width}x{height})")]
    EmptyLayer { width: u32, height: u32 },
    #[error("mask target size must be non-zero (got {width}x{height})")]
    InvalidTarget { width: u32, height: u32 },
    #[error("scale must be a positive finite number (got {0})")]
    InvalidScale(f64),
    #[error("scaling {width}x{height} by {scale} leaves no pixels")]
    ScaledToNothing { width: u32, height: u32, scale: f64 },
    #[error("scaling {width}x{height} by {scale} exceeds {limit} pixels")]
    ScaleTooLarge {
        width: u32,
        height: u32,
        scale: f64,
        limit: u64,
    },
}

pub type Result<T> = std::result::Result<T, CompositeError>;

pub(crate) fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CompositeError::EmptyImage { width, height });
    }
    Ok(())
}
