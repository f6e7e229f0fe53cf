//! Error types for `lspk`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `lspk` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file has no recognisable LSPK header at either end.
    #[error("not an LSPK archive: no signature or legacy version marker found")]
    InvalidSignature,

    /// The file is a continuation part of a multi-part archive.
    ///
    /// Continuation parts carry no directory; open the named parent
    /// instead.
    #[error("file is part {part} of a multi-part archive; open {parent} instead")]
    ContinuationPart {
        /// Path of the main archive holding the directory.
        parent: PathBuf,
        /// The continuation part number (1+).
        part: u32,
    },

    /// The version field parsed but no codec exists for it.
    #[error("unsupported archive version: {version}")]
    UnsupportedVersion {
        /// The version number found in the file.
        version: u32,
    },

    /// The archive ended before a complete header could be read.
    #[error("truncated header: expected {expected} bytes")]
    TruncatedHeader {
        /// Bytes the header layout requires.
        expected: u64,
    },

    /// A directory entry or payload region ended early.
    #[error("truncated entry at index {index}")]
    TruncatedEntry {
        /// Zero-based index of the affected entry.
        index: usize,
    },

    /// LZ4 block decode failed or produced the wrong number of bytes.
    #[error("LZ4 decompression failed: {message}")]
    CompressionFailed {
        /// The decoder error or size-mismatch description.
        message: String,
    },

    /// The requested file name is not in the archive directory.
    #[error("file not found in archive: {0}")]
    FileNotFound(String),

    /// An archive name exceeds the 255-byte on-disk slot.
    #[error("name too long for archive ({length} bytes, limit 255): {name}")]
    NameTooLong {
        /// The offending name.
        name: String,
        /// Its length in bytes.
        length: usize,
    },

    /// A payload does not fit the on-disk size field of the target version.
    #[error("file too large for archive format ({size} bytes): {name}")]
    FileTooLarge {
        /// The archive name of the file.
        name: String,
        /// The payload size in bytes.
        size: u64,
    },

    /// The archive grew past what the target version's offset fields can address.
    #[error("archive too large for format offset fields: {size} bytes")]
    ArchiveTooLarge {
        /// The offending offset or total size.
        size: u64,
    },

    /// A multi-part continuation file does not exist on disk.
    #[error("archive part file not found: {path}")]
    ArchivePartMissing {
        /// The expected path to the archive part.
        path: PathBuf,
    },

    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl Error {
    /// Map an `UnexpectedEof` from a fixed-size header read to the typed
    /// truncation error; pass other IO errors through.
    pub(crate) fn truncated_header(err: std::io::Error, expected: u64) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedHeader { expected }
        } else {
            Error::Io(err)
        }
    }

    /// Same mapping for directory-entry and payload reads.
    pub(crate) fn truncated_entry(err: std::io::Error, index: usize) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedEntry { index }
        } else {
            Error::Io(err)
        }
    }
}

/// A specialized Result type for `lspk` operations.
pub type Result<T> = std::result::Result<T, Error>;
