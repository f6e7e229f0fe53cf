//! SPDX-FileCopyrightText: 2026 lspk contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Archive variant detection
//!
//! Classifies a byte stream as a specific archive version, a continuation
//! part of a multi-part archive, or not an archive at all. Probing starts
//! at the end of the stream: version 13 archives carry their signature in
//! the last four bytes and have arbitrary payload bytes at offset 0.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use byteorder::{LittleEndian, ReadBytesExt};
use regex::{Regex, RegexBuilder};

use super::{MAGIC, Package};
use crate::error::Result;

/// Where the `LSPK` signature sits for a detected version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureLocation {
    /// Signature in the first four bytes (versions 10, 15, 16, 18).
    Start,
    /// Signature in the last four bytes (version 13).
    End,
    /// No signature; the file starts with a bare version number (7, 9).
    None,
}

/// Outcome of probing a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionResult {
    /// A parseable archive of the given version.
    Valid {
        /// Version number read from the header.
        version: u32,
        /// Signature placement for this variant.
        signature: SignatureLocation,
    },
    /// A continuation part; the directory lives in `parent_path`.
    Continuation {
        /// Path of the main archive.
        parent_path: PathBuf,
        /// Part number parsed from the file name.
        part_number: u32,
    },
    /// Not recognisable as any archive variant.
    Invalid,
}

/// Continuation parts are named `<base>_<N>.pak`, case-insensitive.
static PART_NAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^(.+)_(\d+)\.pak$")
        .case_insensitive(true)
        .build()
        .expect("valid part-name pattern")
});

/// Probe a stream (and optionally its path) for an archive variant.
///
/// Reads a bounded number of bytes from the stream ends; the only larger
/// read is the parent's directory when verifying a continuation file.
///
/// # Errors
///
/// Returns [`Error::Io`] if seeking or reading the probe bytes fails.
///
/// [`Error::Io`]: crate::Error::Io
pub fn detect<R: Read + Seek>(
    reader: &mut R,
    path_hint: Option<&Path>,
) -> Result<DetectionResult> {
    let len = reader.seek(SeekFrom::End(0))?;

    if len >= 8 {
        // End-of-file signature first: a version 13 archive is payload
        // bytes from offset 0 and only the trailer identifies it.
        reader.seek(SeekFrom::End(-8))?;
        let header_size = u64::from(reader.read_u32::<LittleEndian>()?);
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig == MAGIC && (8..=len).contains(&header_size) {
            reader.seek(SeekFrom::Start(len - header_size))?;
            let version = reader.read_u32::<LittleEndian>()?;
            return Ok(DetectionResult::Valid {
                version,
                signature: SignatureLocation::End,
            });
        }
    }

    if len >= 4 {
        reader.seek(SeekFrom::Start(0))?;
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig == MAGIC && len >= 8 {
            let version = reader.read_u32::<LittleEndian>()?;
            return Ok(DetectionResult::Valid {
                version,
                signature: SignatureLocation::Start,
            });
        }

        // Bare little-endian version word; probed last to avoid false
        // positives on arbitrary binary files.
        let version = u32::from_le_bytes(sig);
        if version == 7 || version == 9 {
            return Ok(DetectionResult::Valid {
                version,
                signature: SignatureLocation::None,
            });
        }
    }

    if let Some(path) = path_hint
        && let Some(result) = detect_continuation(path)
    {
        return Ok(result);
    }

    Ok(DetectionResult::Invalid)
}

/// Resolve `<base>_<N>.pak` against its parent's directory.
///
/// Continuation parts carry no signature of their own, so the name match
/// is confirmed by checking that the parent archive actually references
/// part N. This keeps unrelated files named `something_1.pak` out.
fn detect_continuation(path: &Path) -> Option<DetectionResult> {
    let name = path.file_name()?.to_str()?;
    let caps = PART_NAME.captures(name)?;
    let part_number: u32 = caps[2].parse().ok()?;
    let parent_path = path.with_file_name(format!("{}.pak", &caps[1]));

    if !parent_path.exists() {
        return None;
    }

    let parent = Package::read(&parent_path).ok()?;
    if parent.files.iter().any(|f| f.archive_part == part_number) {
        Some(DetectionResult::Continuation {
            parent_path,
            part_number,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn start_signature_detects_version() {
        let mut bytes = b"LSPK".to_vec();
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 36]);

        let result = detect(&mut Cursor::new(bytes), None).unwrap();
        assert_eq!(
            result,
            DetectionResult::Valid {
                version: 18,
                signature: SignatureLocation::Start,
            }
        );
    }

    #[test]
    fn bare_version_word_detects_legacy() {
        let mut bytes = 9u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 17]);

        let result = detect(&mut Cursor::new(bytes), None).unwrap();
        assert_eq!(
            result,
            DetectionResult::Valid {
                version: 9,
                signature: SignatureLocation::None,
            }
        );
    }

    #[test]
    fn end_signature_wins_over_start_probe() {
        // Trailer: 8-byte pseudo header (version word), size 8, LSPK.
        let mut bytes = vec![0xAAu8; 32];
        bytes.extend_from_slice(&13u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 4]);
        let header_size = 8u32 + 8;
        bytes.extend_from_slice(&header_size.to_le_bytes());
        bytes.extend_from_slice(b"LSPK");

        let result = detect(&mut Cursor::new(bytes), None).unwrap();
        assert_eq!(
            result,
            DetectionResult::Valid {
                version: 13,
                signature: SignatureLocation::End,
            }
        );
    }

    #[test]
    fn bare_version_word_needs_only_four_bytes() {
        let bytes = 7u32.to_le_bytes().to_vec();

        let result = detect(&mut Cursor::new(bytes), None).unwrap();
        assert_eq!(
            result,
            DetectionResult::Valid {
                version: 7,
                signature: SignatureLocation::None,
            }
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let bytes = vec![0x5Au8; 64];
        let result = detect(&mut Cursor::new(bytes), None).unwrap();
        assert_eq!(result, DetectionResult::Invalid);
    }

    #[test]
    fn short_files_are_invalid() {
        let result = detect(&mut Cursor::new(vec![0u8; 5]), None).unwrap();
        assert_eq!(result, DetectionResult::Invalid);
    }
}
