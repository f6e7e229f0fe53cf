//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Reader for the version 10 layout
//!
//! Signature at offset 0, 20-byte header, then an uncompressed directory.
//! On-disk payload offsets are relative to `data_offset` and normalised
//! to absolute positions here.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::parse_entry_280;
use crate::error::{Error, Result};
use crate::pak::Package;

pub(crate) const ENTRY_SIZE: usize = 280;
const HEADER_SIZE: u64 = 20;

struct Header {
    version: u32,
    data_offset: u32,
    flags: u8,
    num_files: u32,
}

fn read_header<R: Read>(reader: &mut R) -> std::io::Result<Header> {
    let version = reader.read_u32::<LittleEndian>()?;
    let data_offset = reader.read_u32::<LittleEndian>()?;
    let _file_list_size = reader.read_u32::<LittleEndian>()?;
    let _num_parts = reader.read_u16::<LittleEndian>()?;
    let flags = reader.read_u8()?;
    let _priority = reader.read_u8()?;
    let num_files = reader.read_u32::<LittleEndian>()?;
    Ok(Header {
        version,
        data_offset,
        flags,
        num_files,
    })
}

pub(crate) fn read<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Package> {
    reader.seek(SeekFrom::Start(4))?;
    let header = read_header(reader).map_err(|e| Error::truncated_header(e, 4 + HEADER_SIZE))?;

    let mut files = Vec::with_capacity(header.num_files as usize);
    let mut entry = [0u8; ENTRY_SIZE];
    for index in 0..header.num_files as usize {
        reader
            .read_exact(&mut entry)
            .map_err(|e| Error::truncated_entry(e, index))?;
        let mut file = parse_entry_280(&entry);
        file.offset += u64::from(header.data_offset);
        files.push(file);
    }

    Ok(Package {
        version: header.version,
        files,
        path: path.to_path_buf(),
        flags: header.flags,
    })
}
