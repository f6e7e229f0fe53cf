//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Per-version archive writers
//!
//! Writers collect pending files in memory and materialise the archive on
//! `save`. Insertion order is preserved on disk. Shared here: pending
//! file validation, the stored/compressed payload encoding rule, entry
//! serialisation, and directory ingestion.

mod v10;
mod v13;
mod v18;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::codec::{push_name, split_offset, validate_name};
use super::{FLAG_LZ4, FileEntry};
use crate::compression::compress_block;
use crate::error::{Error, Result};
use crate::utils::path::normalize_separators;

pub use v10::WriterV10;
pub use v13::WriterV13;
pub use v18::WriterV18;

/// A file queued on a writer, not yet on disk.
pub(crate) struct PendingFile {
    pub name: String,
    pub data: Vec<u8>,
    pub compress: bool,
}

impl PendingFile {
    /// Validate and normalise a queued file. Name problems surface here,
    /// before `save` creates any output.
    pub(crate) fn new(name: &str, data: Vec<u8>, compress: bool) -> Result<Self> {
        let name = normalize_separators(name);
        validate_name(&name)?;
        Ok(Self {
            name,
            data,
            compress,
        })
    }

    /// Apply the storage rule: compressed payloads carry the true
    /// uncompressed size and the LZ4 flag; stored payloads write the
    /// zero sentinel and no flags. Empty payloads are always stored.
    pub(crate) fn into_encoded(self) -> (String, EncodedPayload) {
        if self.compress && !self.data.is_empty() {
            let uncompressed_size = self.data.len() as u64;
            let bytes = compress_block(&self.data);
            (
                self.name,
                EncodedPayload {
                    bytes,
                    flags: FLAG_LZ4,
                    uncompressed_size,
                },
            )
        } else {
            (
                self.name,
                EncodedPayload {
                    bytes: self.data,
                    flags: 0,
                    uncompressed_size: 0,
                },
            )
        }
    }
}

/// Payload bytes ready for the output stream, with the directory fields
/// they imply.
pub(crate) struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub flags: u8,
    pub uncompressed_size: u64,
}

/// Serialise 280-byte entries (versions 10 and 13). The CRC word is
/// written as zero.
pub(crate) fn serialize_entries_280(entries: &[FileEntry]) -> Result<Vec<u8>> {
    let mut table = Vec::with_capacity(entries.len() * 280);
    for entry in entries {
        push_name(&mut table, &entry.name);
        table.extend_from_slice(&narrow_offset(entry.offset)?.to_le_bytes());
        table.extend_from_slice(&narrow_size(entry, entry.size_on_disk)?.to_le_bytes());
        table.extend_from_slice(&narrow_size(entry, entry.uncompressed_size)?.to_le_bytes());
        table.extend_from_slice(&entry.archive_part.to_le_bytes());
        table.extend_from_slice(&u32::from(entry.flags).to_le_bytes());
        table.extend_from_slice(&0u32.to_le_bytes());
    }
    Ok(table)
}

/// Serialise 272-byte entries with the 48-bit split offset (version 18).
pub(crate) fn serialize_entries_v18(entries: &[FileEntry]) -> Result<Vec<u8>> {
    let mut table = Vec::with_capacity(entries.len() * 272);
    for entry in entries {
        push_name(&mut table, &entry.name);
        let (offset_lo, offset_hi) = split_offset(entry.offset)?;
        table.extend_from_slice(&offset_lo.to_le_bytes());
        table.extend_from_slice(&offset_hi.to_le_bytes());
        let part = u8::try_from(entry.archive_part)
            .map_err(|_| Error::ArchiveTooLarge {
                size: entry.archive_part.into(),
            })?;
        table.push(part);
        table.push(entry.flags);
        table.extend_from_slice(&narrow_size(entry, entry.size_on_disk)?.to_le_bytes());
        table.extend_from_slice(&narrow_size(entry, entry.uncompressed_size)?.to_le_bytes());
    }
    Ok(table)
}

fn narrow_offset(offset: u64) -> Result<u32> {
    u32::try_from(offset).map_err(|_| Error::ArchiveTooLarge { size: offset })
}

fn narrow_size(entry: &FileEntry, size: u64) -> Result<u32> {
    u32::try_from(size).map_err(|_| Error::FileTooLarge {
        name: entry.name.clone(),
        size,
    })
}

/// Walk `root` and return `(archive_name, bytes)` pairs in a
/// deterministic order, skipping `.DS_Store` droppings.
pub(crate) fn collect_directory(root: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name() == ".DS_Store" {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::InvalidPath(entry.path().display().to_string()))?;
        let name = normalize_separators(&relative.to_string_lossy());
        let data = std::fs::read(entry.path())?;
        files.push((name, data));
    }

    Ok(files)
}

/// Remove output files left behind by a failed `save`.
pub(crate) fn remove_partial_outputs(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("failed to remove partial archive {}: {e}", path.display());
        }
    }
}

/// Pack a directory into a version 18 archive with LZ4 compression.
///
/// # Errors
///
/// Returns [`Error::Io`] if the source tree cannot be read or the output
/// cannot be written, and [`Error::NameTooLong`] if a relative path does
/// not fit the 256-byte name slot.
pub fn create_pak<P: AsRef<Path>>(source_dir: P, output_pak: P) -> Result<()> {
    let source_dir = source_dir.as_ref();
    tracing::info!("packing directory: {}", source_dir.display());

    let mut writer = WriterV18::new(output_pak.as_ref());
    writer.add_directory(source_dir, true)?;

    tracing::info!("writing {} files", writer.file_count());
    writer.save()
}
