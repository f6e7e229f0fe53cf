//! lspk - Reader and writer for the LSPK game archive format
//!
//! An LSPK archive bundles thousands of named game assets with optional
//! per-file LZ4 block compression, and may be split across several
//! physical `.pak` part files. This crate detects the on-disk version
//! from bytes alone, parses the directory, extracts single files with
//! random access (resolving multi-part continuations), and writes
//! archives in versions 10, 13 and 18.

pub mod compression;
pub mod error;
pub mod pak;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::pak::{
        DetectionResult, FileEntry, Package, SignatureLocation, WriterV10, WriterV13, WriterV18,
        detect,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
