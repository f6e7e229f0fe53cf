//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Writer for the version 10 layout
//!
//! Version 10 archives store every payload uncompressed, so there is no
//! compress knob on this writer. Layout: signature, 20-byte header,
//! directory with offsets relative to `data_offset`, then payloads.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};

use super::{PendingFile, remove_partial_outputs, serialize_entries_280};
use crate::error::{Error, Result};
use crate::pak::{FileEntry, MAGIC};

const ENTRY_SIZE: u32 = 280;
const HEADER_SIZE: u32 = 20;

/// Builds a version 10 archive from in-memory files.
pub struct WriterV10 {
    path: PathBuf,
    pending: Vec<PendingFile>,
}

impl WriterV10 {
    /// Create a writer targeting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: Vec::new(),
        }
    }

    /// Queue a file for the archive. Payloads are always stored raw.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameTooLong`] if `name` exceeds 255 bytes.
    pub fn add_file(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        self.pending.push(PendingFile::new(name, data, false)?);
        Ok(())
    }

    /// Queue a file read from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if `source` cannot be read, plus the
    /// failure modes of [`WriterV10::add_file`].
    pub fn add_file_from_path(&mut self, name: &str, source: impl AsRef<Path>) -> Result<()> {
        let data = std::fs::read(source)?;
        self.add_file(name, data)
    }

    /// Queue every file under `root`, named by its normalised relative
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the tree cannot be read, plus the
    /// failure modes of [`WriterV10::add_file`].
    pub fn add_directory(&mut self, root: impl AsRef<Path>) -> Result<()> {
        for (name, data) in super::collect_directory(root.as_ref())? {
            self.add_file(&name, data)?;
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
    /// On failure the partially written output file is removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileTooLarge`] / [`Error::ArchiveTooLarge`] if a
    /// payload or the directory overflows the 32-bit on-disk fields, and
    /// [`Error::Io`] for write failures.
    pub fn save(self) -> Result<()> {
        let path = self.path.clone();
        let result = self.write_archive();
        if result.is_err() {
            remove_partial_outputs(&[path]);
        }
        result
    }

    fn write_archive(self) -> Result<()> {
        let num_files = u32::try_from(self.pending.len()).map_err(|_| Error::ArchiveTooLarge {
            size: self.pending.len() as u64,
        })?;
        let file_list_size = num_files
            .checked_mul(ENTRY_SIZE)
            .ok_or(Error::ArchiveTooLarge {
                size: u64::from(num_files) * u64::from(ENTRY_SIZE),
            })?;
        let data_offset = file_list_size
            .checked_add(4 + HEADER_SIZE)
            .ok_or(Error::ArchiveTooLarge {
                size: u64::from(file_list_size) + u64::from(4 + HEADER_SIZE),
            })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&self.path)?);

        out.write_all(&MAGIC)?;
        out.write_u32::<LittleEndian>(10)?;
        out.write_u32::<LittleEndian>(data_offset)?;
        out.write_u32::<LittleEndian>(file_list_size)?;
        out.write_u16::<LittleEndian>(1)?; // num_parts
        out.write_u8(0)?; // flags
        out.write_u8(0)?; // priority
        out.write_u32::<LittleEndian>(num_files)?;

        // Directory first; offsets are relative to data_offset.
        let mut entries = Vec::with_capacity(self.pending.len());
        let mut relative_offset = 0u64;
        for file in &self.pending {
            let size = file.data.len() as u64;
            entries.push(FileEntry {
                name: file.name.clone(),
                offset: relative_offset,
                size_on_disk: size,
                uncompressed_size: 0,
                archive_part: 0,
                flags: 0,
            });
            relative_offset += size;
        }
        out.write_all(&serialize_entries_280(&entries)?)?;

        for file in &self.pending {
            out.write_all(&file.data)?;
        }

        out.flush()?;
        Ok(())
    }
}
