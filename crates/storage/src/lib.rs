//! On-disk state for maskmerge: user settings and the output directory of
//! generated artifacts. There is no index or manifest; the files are the state.

pub mod atomic;
pub mod outputs;
pub mod paths;
pub mod settings;
