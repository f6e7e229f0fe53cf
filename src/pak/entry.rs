//! Directory entry for a single archived file

use super::FLAG_LZ4;

/// One file in the archive directory.
///
/// `offset` and the sizes are carried as `u64` in memory regardless of
/// the on-disk field widths of the source version. For version 10 the
/// reader has already converted the on-disk relative offset to an
/// absolute position in the part file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path within the archive, forward-slash separated.
    pub name: String,
    /// Byte position of the payload inside its part file.
    pub offset: u64,
    /// Bytes the payload occupies on disk.
    pub size_on_disk: u64,
    /// Original payload length. Zero means "stored uncompressed", not
    /// "empty file"; empty files have `size_on_disk == 0`.
    pub uncompressed_size: u64,
    /// Which part file holds the payload (0 = main archive).
    pub archive_part: u32,
    /// Entry flags; only [`FLAG_LZ4`] is defined.
    pub flags: u8,
}

impl FileEntry {
    /// Whether the payload is an LZ4 block.
    ///
    /// For the flag-less legacy formats the reader has already set the
    /// bit from the size-based inference rule.
    #[must_use]
    pub fn compressed(&self) -> bool {
        self.flags & FLAG_LZ4 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lz4_flag_drives_the_predicate() {
        let mut entry = FileEntry {
            name: "a.txt".to_string(),
            offset: 0,
            size_on_disk: 10,
            uncompressed_size: 0,
            archive_part: 0,
            flags: 0,
        };
        assert!(!entry.compressed());

        entry.flags = FLAG_LZ4;
        entry.uncompressed_size = 32;
        assert!(entry.compressed());
    }
}
