//! LSPK archive reading and writing
//!
//! Supports the on-disk versions shipped across the game family: 7/9
//! (signatureless), 10 (start signature, stored payloads), 13 (end
//! signature, multi-part capable), and 15/16/18 (start signature,
//! compressed directory). Writers exist for versions 10, 13 and 18.

mod codec;
mod detect;
mod entry;
mod package;
mod reader;
mod writer;

pub use detect::{DetectionResult, SignatureLocation, detect};
pub use entry::FileEntry;
pub use package::{Package, read_file_bytes};
pub use writer::{WriterV10, WriterV13, WriterV18, create_pak};

// Internal constants
pub(crate) const MAGIC: [u8; 4] = [b'L', b'S', b'P', b'K'];
pub(crate) const NAME_LENGTH: usize = 256;

/// LZ4 block compression bit in the entry flags byte.
pub const FLAG_LZ4: u8 = 0x02;
