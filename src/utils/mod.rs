//! Utility functions

pub mod path;

pub use path::{normalize_separators, part_file_path};
