//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Archive facade: directory access and random-access extraction

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::{FileEntry, reader};
use crate::compression::decompress_block;
use crate::error::{Error, Result};
use crate::utils::path::part_file_path;

/// A parsed archive directory.
///
/// Owns the file table but not the payloads; every extraction re-opens
/// the relevant part file, so a `Package` can be shared across threads
/// and extracted from concurrently.
#[derive(Debug, Clone)]
pub struct Package {
    /// On-disk format version.
    pub version: u32,
    /// Directory entries in on-disk order.
    pub files: Vec<FileEntry>,
    /// Path of the main part file.
    pub path: PathBuf,
    /// Header-level flags, preserved opaquely.
    pub flags: u8,
}

impl Package {
    /// Open and parse an archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the file is not an archive,
    /// [`Error::ContinuationPart`] if it is a continuation of a
    /// multi-part archive (the error names the main part to open),
    /// [`Error::UnsupportedVersion`] for unknown version fields, and
    /// [`Error::Io`] / [`Error::CompressionFailed`] for read or
    /// directory-decode failures.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        reader::read_package(&mut reader, path)
    }

    /// Look up a directory entry by archive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Archive names in directory order.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    /// Extract a single file by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the name is not in the
    /// directory, plus the failure modes of [`Package::extract_entry`].
    pub fn extract(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;
        self.extract_entry(entry)
    }

    /// Extract a single entry's payload.
    ///
    /// Empty files short-circuit to an empty buffer without touching the
    /// codec. The part file holding the payload is opened per call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchivePartMissing`] if the continuation part
    /// holding the payload does not exist, [`Error::CompressionFailed`]
    /// if the LZ4 block does not decode to the recorded size, and
    /// [`Error::Io`] for read failures.
    pub fn extract_entry(&self, entry: &FileEntry) -> Result<Vec<u8>> {
        if entry.size_on_disk == 0 {
            return Ok(Vec::new());
        }

        let part_path = part_file_path(&self.path, entry.archive_part)
            .ok_or_else(|| Error::InvalidPath(self.path.display().to_string()))?;
        if !part_path.exists() {
            return Err(Error::ArchivePartMissing { path: part_path });
        }

        let mut file = File::open(&part_path)?;
        file.seek(SeekFrom::Start(entry.offset))?;

        let mut data = vec![0u8; entry.size_on_disk as usize];
        file.read_exact(&mut data)?;

        if entry.compressed() {
            decompress_block(&data, entry.uncompressed_size as usize)
        } else {
            Ok(data)
        }
    }

    /// Extract every file into `output_dir`, creating directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Stops at the first entry that fails to extract or write; the
    /// failing entry is named in a warning before the error propagates.
    /// Already-written files are left in place.
    pub fn extract_all<P: AsRef<Path>>(&self, output_dir: P) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        for entry in &self.files {
            let data = match self.extract_entry(entry) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("failed to extract {}: {e}", entry.name);
                    return Err(e);
                }
            };

            let output_path = output_dir.join(&entry.name);
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, &data)?;
        }

        Ok(())
    }
}

/// Read a single file's bytes from an archive without keeping the
/// directory around.
///
/// # Errors
///
/// See [`Package::read`] and [`Package::extract`].
pub fn read_file_bytes<P: AsRef<Path>>(pak_path: P, name: &str) -> Result<Vec<u8>> {
    Package::read(pak_path)?.extract(name)
}
