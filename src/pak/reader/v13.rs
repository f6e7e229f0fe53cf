//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Reader for the version 13 layout
//!
//! Footer-based: the last eight bytes are a header-size word and the
//! signature, the 32-byte header sits `header_size` bytes before the end,
//! and the LZ4-compressed directory lives wherever `file_list_offset`
//! points. Payload offsets are absolute.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::parse_entry_280;
use crate::compression::decompress_block;
use crate::error::{Error, Result};
use crate::pak::Package;

pub(crate) const ENTRY_SIZE: usize = 280;
const HEADER_SIZE: u64 = 32;
// Header plus the trailing size word and signature.
const FOOTER_SIZE: u64 = HEADER_SIZE + 8;

struct Header {
    version: u32,
    file_list_offset: u32,
    file_list_size: u32,
    flags: u8,
}

fn read_header<R: Read>(reader: &mut R) -> std::io::Result<Header> {
    let version = reader.read_u32::<LittleEndian>()?;
    let file_list_offset = reader.read_u32::<LittleEndian>()?;
    let file_list_size = reader.read_u32::<LittleEndian>()?;
    let _num_parts = reader.read_u16::<LittleEndian>()?;
    let flags = reader.read_u8()?;
    let _priority = reader.read_u8()?;
    let mut md5 = [0u8; 16];
    reader.read_exact(&mut md5)?;
    Ok(Header {
        version,
        file_list_offset,
        file_list_size,
        flags,
    })
}

pub(crate) fn read<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Package> {
    let len = reader.seek(SeekFrom::End(0))?;
    if len < FOOTER_SIZE {
        return Err(Error::TruncatedHeader {
            expected: FOOTER_SIZE,
        });
    }

    reader.seek(SeekFrom::End(-8))?;
    let header_size = u64::from(reader.read_u32::<LittleEndian>()?);
    if header_size < FOOTER_SIZE || header_size > len {
        return Err(Error::TruncatedHeader {
            expected: FOOTER_SIZE,
        });
    }

    reader.seek(SeekFrom::Start(len - header_size))?;
    let header = read_header(reader).map_err(|e| Error::truncated_header(e, HEADER_SIZE))?;

    reader.seek(SeekFrom::Start(header.file_list_offset.into()))?;
    let num_files = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| Error::truncated_header(e, 4))?;

    if header.file_list_size < 4 {
        return Err(Error::TruncatedHeader { expected: 4 });
    }
    let mut compressed = vec![0u8; header.file_list_size as usize - 4];
    reader
        .read_exact(&mut compressed)
        .map_err(|e| Error::truncated_entry(e, 0))?;

    let table = decompress_block(&compressed, num_files as usize * ENTRY_SIZE)?;

    let files = table.chunks_exact(ENTRY_SIZE).map(parse_entry_280).collect();

    Ok(Package {
        version: header.version,
        files,
        path: path.to_path_buf(),
        flags: header.flags,
    })
}
