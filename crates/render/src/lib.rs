//! Local image compositing for maskmerge.
//!
//! Everything here is a pure transform over in-memory RGBA/Luma buffers:
//! - `square`: centered square crop
//! - `mask`: painted overlay -> binary mask at a target resolution
//! - `alpha`: replace an image's alpha with a mask (the cutout step)
//! - `merge`: scale a cutout and paste it onto a background

pub mod alpha;
pub mod error;
pub mod mask;
pub mod merge;
pub mod square;

pub use alpha::{apply_alpha, keep_opaque};
pub use error::CompositeError;
pub use mask::{rasterize, rasterize_editor_output, EditorOutput, Mask, MaskResample};
pub use merge::{merge, merge_with_filter, Merged, Placement};
pub use square::{crop_to_square, square_region, SquareRegion};
