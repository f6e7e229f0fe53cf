//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Reader for the version 15/16/18 layout
//!
//! Signature at offset 0, 36-byte header, LZ4-compressed directory at
//! `file_list_offset`. Version 18 packs entries into 272 bytes with a
//! 48-bit split offset; 15 and 16 use wide 296-byte entries.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::compression::decompress_block;
use crate::error::{Error, Result};
use crate::pak::codec::{join_offset, read_name};
use crate::pak::{FileEntry, NAME_LENGTH, Package};

pub(crate) const ENTRY_SIZE_V18: usize = 272;
pub(crate) const ENTRY_SIZE_V15: usize = 296;
const HEADER_SIZE: u64 = 36;

struct Header {
    version: u32,
    file_list_offset: u64,
    flags: u8,
}

fn read_header<R: Read>(reader: &mut R) -> std::io::Result<Header> {
    let version = reader.read_u32::<LittleEndian>()?;
    let file_list_offset = reader.read_u64::<LittleEndian>()?;
    let _file_list_size = reader.read_u32::<LittleEndian>()?;
    let flags = reader.read_u8()?;
    let _priority = reader.read_u8()?;
    let mut md5 = [0u8; 16];
    reader.read_exact(&mut md5)?;
    let _num_parts = reader.read_u16::<LittleEndian>()?;
    Ok(Header {
        version,
        file_list_offset,
        flags,
    })
}

fn parse_entry_v18(bytes: &[u8]) -> FileEntry {
    let name = read_name(&bytes[..NAME_LENGTH]);
    let offset_lo = u32::from_le_bytes(bytes[256..260].try_into().unwrap());
    let offset_hi = u16::from_le_bytes(bytes[260..262].try_into().unwrap());
    let archive_part = bytes[262];
    let flags = bytes[263];
    let size_on_disk = u32::from_le_bytes(bytes[264..268].try_into().unwrap());
    let uncompressed_size = u32::from_le_bytes(bytes[268..272].try_into().unwrap());

    FileEntry {
        name,
        offset: join_offset(offset_lo, offset_hi),
        size_on_disk: size_on_disk.into(),
        uncompressed_size: uncompressed_size.into(),
        archive_part: archive_part.into(),
        flags,
    }
}

fn parse_entry_wide(bytes: &[u8]) -> FileEntry {
    let name = read_name(&bytes[..NAME_LENGTH]);
    let offset = u64::from_le_bytes(bytes[256..264].try_into().unwrap());
    let size_on_disk = u64::from_le_bytes(bytes[264..272].try_into().unwrap());
    let uncompressed_size = u64::from_le_bytes(bytes[272..280].try_into().unwrap());
    let archive_part = u32::from_le_bytes(bytes[280..284].try_into().unwrap());
    let flags = u32::from_le_bytes(bytes[284..288].try_into().unwrap());
    // crc and a reserved word trail the entry; both ignored

    FileEntry {
        name,
        offset,
        size_on_disk,
        uncompressed_size,
        archive_part,
        flags: flags as u8,
    }
}

pub(crate) fn read<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Package> {
    reader.seek(SeekFrom::Start(4))?;
    let header = read_header(reader).map_err(|e| Error::truncated_header(e, 4 + HEADER_SIZE))?;

    let entry_size = if header.version == 18 {
        ENTRY_SIZE_V18
    } else {
        tracing::warn!(
            "version {} archives are untested; attempting the wide entry layout",
            header.version
        );
        ENTRY_SIZE_V15
    };

    reader.seek(SeekFrom::Start(header.file_list_offset))?;
    let num_files = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| Error::truncated_header(e, 8))?;
    let compressed_size = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| Error::truncated_header(e, 8))?;

    let mut compressed = vec![0u8; compressed_size as usize];
    reader
        .read_exact(&mut compressed)
        .map_err(|e| Error::truncated_entry(e, 0))?;

    let table = decompress_block(&compressed, num_files as usize * entry_size)?;

    let parse = if header.version == 18 {
        parse_entry_v18
    } else {
        parse_entry_wide
    };
    let files = table.chunks_exact(entry_size).map(parse).collect();

    Ok(Package {
        version: header.version,
        files,
        path: path.to_path_buf(),
        flags: header.flags,
    })
}
