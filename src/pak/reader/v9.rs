//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Reader for the signatureless legacy layout (versions 7 and 9)
//!
//! The header sits at offset 0 and the uncompressed directory follows it
//! immediately; payload offsets are absolute.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::parse_entry_legacy;
use crate::error::{Error, Result};
use crate::pak::Package;

pub(crate) const ENTRY_SIZE: usize = 272;
const HEADER_SIZE: u64 = 21;

struct Header {
    version: u32,
    num_files: u32,
}

fn read_header<R: Read>(reader: &mut R) -> std::io::Result<Header> {
    let version = reader.read_u32::<LittleEndian>()?;
    let _data_offset = reader.read_u32::<LittleEndian>()?;
    let _num_parts = reader.read_u32::<LittleEndian>()?;
    let _file_list_size = reader.read_u32::<LittleEndian>()?;
    let _little_endian = reader.read_u8()?;
    let num_files = reader.read_u32::<LittleEndian>()?;
    Ok(Header { version, num_files })
}

pub(crate) fn read<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Package> {
    reader.seek(SeekFrom::Start(0))?;
    let header = read_header(reader).map_err(|e| Error::truncated_header(e, HEADER_SIZE))?;

    if header.version == 7 {
        tracing::warn!(
            "version 7 archive parsed with the version 9 field widths; \
             no production archive of this version has been verified"
        );
    }

    let mut files = Vec::with_capacity(header.num_files as usize);
    let mut entry = [0u8; ENTRY_SIZE];
    for index in 0..header.num_files as usize {
        reader
            .read_exact(&mut entry)
            .map_err(|e| Error::truncated_entry(e, index))?;
        files.push(parse_entry_legacy(&entry));
    }

    Ok(Package {
        version: header.version,
        files,
        path: path.to_path_buf(),
        flags: 0,
    })
}
