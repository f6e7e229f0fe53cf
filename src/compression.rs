//! LZ4 block compression utilities
//!
//! The archive format uses raw LZ4 blocks (no frame container), so every
//! decode needs the expected decompressed length from the directory.

use crate::error::{Error, Result};

/// Compress data as a single LZ4 block.
#[must_use]
pub fn compress_block(data: &[u8]) -> Vec<u8> {
    lz4_flex::block::compress(data)
}

/// Decompress a single LZ4 block to exactly `expected_size` bytes.
///
/// # Errors
///
/// Returns [`Error::CompressionFailed`] if the block is malformed or does
/// not decode to exactly `expected_size` bytes.
pub fn decompress_block(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let decompressed = lz4_flex::block::decompress(data, expected_size)
        .map_err(|e| Error::CompressionFailed {
            message: format!("LZ4: {e}"),
        })?;

    if decompressed.len() != expected_size {
        return Err(Error::CompressionFailed {
            message: format!(
                "LZ4 size mismatch: expected {expected_size} bytes, got {}",
                decompressed.len()
            ),
        });
    }

    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_round_trip() {
        let data = b"hello world hello world hello world".repeat(20);
        let compressed = compress_block(&data);
        assert!(compressed.len() < data.len());

        let decompressed = decompress_block(&compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn wrong_expected_size_is_an_error() {
        let data = b"some payload bytes".to_vec();
        let compressed = compress_block(&data);

        let result = decompress_block(&compressed, data.len() + 7);
        assert!(matches!(result, Err(Error::CompressionFailed { .. })));
    }

    #[test]
    fn empty_block_round_trip() {
        let compressed = compress_block(&[]);
        let decompressed = decompress_block(&compressed, 0).unwrap();
        assert!(decompressed.is_empty());
    }
}
