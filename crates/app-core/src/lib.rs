//! Request handlers for the mask-and-merge workflow.
//!
//! A `Workspace` owns the settings and output directory; each handler takes a
//! typed request, runs one compositing pipeline to completion and returns a
//! typed response carrying a human-readable status line.

pub mod editor;
pub mod handlers;
pub mod requests;
pub mod workspace;

pub use editor::EditorCanvas;
pub use handlers::subtract_mask;
pub use requests::{
    ImageSource, MergeParams, MergeRequest, MergeResponse, ProcessRequest, ProcessResponse,
    Report, SubtractRequest,
};
pub use workspace::Workspace;
