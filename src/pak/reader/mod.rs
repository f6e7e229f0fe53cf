//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Per-version archive readers and the version dispatch table

mod v9;
mod v10;
mod v13;
mod v18;

use std::io::{Read, Seek};
use std::path::Path;

use super::codec::read_name;
use super::detect::{DetectionResult, detect};
use super::{FLAG_LZ4, FileEntry, NAME_LENGTH, Package};
use crate::error::{Error, Result};

/// Detect the variant and hand the stream to the matching reader.
pub(crate) fn read_package<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Package> {
    match detect(reader, Some(path))? {
        DetectionResult::Valid { version, .. } => match version {
            7 | 9 => v9::read(reader, path),
            10 => v10::read(reader, path),
            13 => v13::read(reader, path),
            15 | 16 | 18 => v18::read(reader, path),
            version => Err(Error::UnsupportedVersion { version }),
        },
        DetectionResult::Continuation {
            parent_path,
            part_number,
        } => Err(Error::ContinuationPart {
            parent: parent_path,
            part: part_number,
        }),
        DetectionResult::Invalid => Err(Error::InvalidSignature),
    }
}

/// Parse one 280-byte entry as used by versions 10 and 13.
///
/// Offsets come back exactly as stored; version 10 callers add
/// `data_offset` afterwards. The trailing CRC word is ignored.
fn parse_entry_280(bytes: &[u8]) -> FileEntry {
    let name = read_name(&bytes[..NAME_LENGTH]);
    let offset = u32::from_le_bytes(bytes[256..260].try_into().unwrap());
    let size_on_disk = u32::from_le_bytes(bytes[260..264].try_into().unwrap());
    let uncompressed_size = u32::from_le_bytes(bytes[264..268].try_into().unwrap());
    let archive_part = u32::from_le_bytes(bytes[268..272].try_into().unwrap());
    let flags = u32::from_le_bytes(bytes[272..276].try_into().unwrap());

    FileEntry {
        name,
        offset: offset.into(),
        size_on_disk: size_on_disk.into(),
        uncompressed_size: uncompressed_size.into(),
        archive_part,
        flags: flags as u8,
    }
}

/// Parse one flag-less 272-byte entry (versions 7 and 9).
///
/// Compression is inferred: a payload is an LZ4 block iff the recorded
/// uncompressed size is non-zero and differs from the on-disk size.
fn parse_entry_legacy(bytes: &[u8]) -> FileEntry {
    let name = read_name(&bytes[..NAME_LENGTH]);
    let offset = u32::from_le_bytes(bytes[256..260].try_into().unwrap());
    let size_on_disk = u32::from_le_bytes(bytes[260..264].try_into().unwrap());
    let uncompressed_size = u32::from_le_bytes(bytes[264..268].try_into().unwrap());
    let archive_part = u32::from_le_bytes(bytes[268..272].try_into().unwrap());

    let compressed = uncompressed_size > 0 && uncompressed_size != size_on_disk;

    FileEntry {
        name,
        offset: offset.into(),
        size_on_disk: size_on_disk.into(),
        uncompressed_size: uncompressed_size.into(),
        archive_part,
        flags: if compressed { FLAG_LZ4 } else { 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_entry_bytes(size_on_disk: u32, uncompressed_size: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(v9::ENTRY_SIZE);
        super::super::codec::push_name(&mut bytes, "scripts/init.lua");
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&size_on_disk.to_le_bytes());
        bytes.extend_from_slice(&uncompressed_size.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes
    }

    #[test]
    fn legacy_inference_marks_shrunk_payloads_compressed() {
        let entry = parse_entry_legacy(&legacy_entry_bytes(40, 120));
        assert!(entry.compressed());
        assert_eq!(entry.uncompressed_size, 120);
    }

    #[test]
    fn legacy_inference_leaves_stored_payloads_alone() {
        // Zero uncompressed size is the stored sentinel.
        let entry = parse_entry_legacy(&legacy_entry_bytes(40, 0));
        assert!(!entry.compressed());

        // Equal sizes mean stored too, whatever the flags would say.
        let entry = parse_entry_legacy(&legacy_entry_bytes(40, 40));
        assert!(!entry.compressed());
    }
}
