//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Writer for the version 18 layout
//!
//! Signature and a header placeholder go out first, payloads stream after
//! them, then the compressed directory; a final seek back fills in the
//! header with the now-known directory position. Single-part only.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};

use super::{PendingFile, remove_partial_outputs, serialize_entries_v18};
use crate::compression::compress_block;
use crate::error::{Error, Result};
use crate::pak::{FileEntry, MAGIC};

const HEADER_SIZE: usize = 36;

/// Builds a version 18 archive from in-memory files.
pub struct WriterV18 {
    path: PathBuf,
    pending: Vec<PendingFile>,
}

impl WriterV18 {
    /// Create a writer targeting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: Vec::new(),
        }
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
    /// failure modes of [`WriterV18::add_file`].
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
    /// failure modes of [`WriterV18::add_file`].
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
    /// On failure the partially written output file is removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileTooLarge`] / [`Error::ArchiveTooLarge`] if a
    /// payload or offset overflows the on-disk fields, and
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
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&self.path)?);

        out.write_all(&MAGIC)?;
        // Header placeholder; rewritten once the directory position is
        // known.
        out.write_all(&[0u8; HEADER_SIZE])?;

        let mut entries: Vec<FileEntry> = Vec::with_capacity(self.pending.len());
        for file in self.pending {
            let (name, payload) = file.into_encoded();
            let offset = out.stream_position()?;
            out.write_all(&payload.bytes)?;
            entries.push(FileEntry {
                name,
                offset,
                size_on_disk: payload.bytes.len() as u64,
                uncompressed_size: payload.uncompressed_size,
                archive_part: 0,
                flags: payload.flags,
            });
        }

        let file_list_offset = out.stream_position()?;
        let num_files = u32::try_from(entries.len()).map_err(|_| Error::ArchiveTooLarge {
            size: entries.len() as u64,
        })?;

        let compressed_table = compress_block(&serialize_entries_v18(&entries)?);
        let compressed_size =
            u32::try_from(compressed_table.len()).map_err(|_| Error::ArchiveTooLarge {
                size: compressed_table.len() as u64,
            })?;

        out.write_u32::<LittleEndian>(num_files)?;
        out.write_u32::<LittleEndian>(compressed_size)?;
        out.write_all(&compressed_table)?;

        // Fill in the header now that the directory position is known.
        out.seek(SeekFrom::Start(4))?;
        out.write_u32::<LittleEndian>(18)?;
        out.write_u64::<LittleEndian>(file_list_offset)?;
        out.write_u32::<LittleEndian>(8 + compressed_size)?;
        out.write_u8(0)?; // flags
        out.write_u8(0)?; // priority
        out.write_all(&[0u8; 16])?; // md5, written as zero
        out.write_u16::<LittleEndian>(1)?; // num_parts

        out.flush()?;
        Ok(())
    }
}
