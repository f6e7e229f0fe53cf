//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Writer for the version 13 layout
//!
//! Payloads stream from offset 0, the compressed directory and header
//! trail them, and the signature is the last four bytes of the file.
//! With a part-size cap configured the writer splits payloads across
//! `<base>_<K>.pak` continuation files; only the main part carries the
//! footer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};

use super::{PendingFile, remove_partial_outputs, serialize_entries_280};
use crate::compression::compress_block;
use crate::error::{Error, Result};
use crate::pak::{FileEntry, MAGIC};
use crate::utils::path::part_file_path;

const HEADER_SIZE: u32 = 32;

/// Builds a version 13 archive, optionally split into parts.
pub struct WriterV13 {
    path: PathBuf,
    max_part_size: Option<u64>,
    pending: Vec<PendingFile>,
}

impl WriterV13 {
    /// Create a writer targeting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_part_size: None,
            pending: Vec::new(),
        }
    }

    /// Cap part files at `bytes`; payloads that would overflow the
    /// current part open the next `<base>_<K>.pak`.
    ///
    /// A payload never spans two parts. The cap is not checked while the
    /// current part is empty, so a single payload larger than `bytes`
    /// still occupies one part by itself (the very first one lands in
    /// part 0). This matches the shipped game tooling.
    #[must_use]
    pub fn with_max_part_size(mut self, bytes: u64) -> Self {
        self.max_part_size = Some(bytes);
        self
    }

    /// Queue a file for the archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameTooLong`] if `name` exceeds 255 bytes.
    pub fn add_file(&mut self, name: &str, data: Vec<u8>, compress: bool) -> Result<()> {
        self.pending.push(PendingFile::new(name, data, compress)?);
        Ok(())
    }

    /// Queue a file read from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if `source` cannot be read, plus the
    /// failure modes of [`WriterV13::add_file`].
    pub fn add_file_from_path(
        &mut self,
        name: &str,
        source: impl AsRef<Path>,
        compress: bool,
    ) -> Result<()> {
        let data = std::fs::read(source)?;
        self.add_file(name, data, compress)
    }

    /// Queue every file under `root`, named by its normalised relative
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the tree cannot be read, plus the
    /// failure modes of [`WriterV13::add_file`].
    pub fn add_directory(&mut self, root: impl AsRef<Path>, compress: bool) -> Result<()> {
        for (name, data) in super::collect_directory(root.as_ref())? {
            self.add_file(&name, data, compress)?;
        }
        Ok(())
    }

    /// Number of files queued so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.pending.len()
    }

    /// Write the archive, consuming the writer.
    ///
    /// On failure every part file created so far is removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileTooLarge`] / [`Error::ArchiveTooLarge`] if a
    /// payload or offset overflows the 32-bit on-disk fields, and
    /// [`Error::Io`] for write failures.
    pub fn save(self) -> Result<()> {
        let mut created = Vec::new();
        let result = self.write_archive(&mut created);
        if result.is_err() {
            remove_partial_outputs(&created);
        }
        result
    }

    fn write_archive(self, created: &mut Vec<PathBuf>) -> Result<()> {
        let main_path = self.path.clone();
        if let Some(parent) = main_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(&main_path)?);
        created.push(main_path.clone());

        let mut entries: Vec<FileEntry> = Vec::with_capacity(self.pending.len());
        let mut part = 0u32;
        let mut part_size = 0u64;

        for file in self.pending {
            let (name, payload) = file.into_encoded();
            let payload_len = payload.bytes.len() as u64;

            // Roll to the next part before this payload would overflow
            // the current one. An empty current part always accepts the
            // payload, oversized or not.
            if let Some(max) = self.max_part_size
                && part_size > 0
                && part_size + payload_len > max
            {
                out.flush()?;
                part += 1;
                let part_path = part_file_path(&main_path, part)
                    .ok_or_else(|| Error::InvalidPath(main_path.display().to_string()))?;
                out = BufWriter::new(File::create(&part_path)?);
                created.push(part_path);
                part_size = 0;
            }

            entries.push(FileEntry {
                name,
                offset: part_size,
                size_on_disk: payload_len,
                uncompressed_size: payload.uncompressed_size,
                archive_part: part,
                flags: payload.flags,
            });
            out.write_all(&payload.bytes)?;
            part_size += payload_len;
        }

        // Footer goes to the main part only; continuation parts are bare
        // payload bytes.
        out.flush()?;
        drop(out);

        let file_list_offset = std::fs::metadata(&main_path)?.len();
        let file_list_offset = u32::try_from(file_list_offset).map_err(|_| {
            Error::ArchiveTooLarge {
                size: file_list_offset,
            }
        })?;

        let num_files = u32::try_from(entries.len()).map_err(|_| Error::ArchiveTooLarge {
            size: entries.len() as u64,
        })?;
        let num_parts = u16::try_from(part + 1).map_err(|_| Error::ArchiveTooLarge {
            size: u64::from(part) + 1,
        })?;

        let compressed_table = compress_block(&serialize_entries_280(&entries)?);
        let file_list_size =
            u32::try_from(4 + compressed_table.len()).map_err(|_| Error::ArchiveTooLarge {
                size: compressed_table.len() as u64,
            })?;

        let mut out = BufWriter::new(OpenOptions::new().append(true).open(&main_path)?);
        out.write_u32::<LittleEndian>(num_files)?;
        out.write_all(&compressed_table)?;

        out.write_u32::<LittleEndian>(13)?;
        out.write_u32::<LittleEndian>(file_list_offset)?;
        out.write_u32::<LittleEndian>(file_list_size)?;
        out.write_u16::<LittleEndian>(num_parts)?;
        out.write_u8(0)?; // flags
        out.write_u8(0)?; // priority
        out.write_all(&[0u8; 16])?; // md5, written as zero

        out.write_u32::<LittleEndian>(HEADER_SIZE + 8)?;
        out.write_all(&MAGIC)?;

        out.flush()?;
        Ok(())
    }
}
