//! SMPA archive format constants, definitions, and the entry codec.
//!
//! An archive is the 8-byte [`FILE_SIGNATURE`] followed by zero or more
//! entries with no padding, index or trailer. Each entry is a fixed
//! [`ENTRY_HEADER_SIZE`]-byte header, the UTF-16LE path, and `pack_size`
//! bytes of content:
//!
//! | Offset | Size | Field |
//! |-------:|-----:|-------|
//! | 0  | 4 | entry magic ([`ENTRY_MAGIC`]) |
//! | 4  | 1 | flags ([`EntryFlags`]) |
//! | 5  | 1 | attributes ([`Attributes`]) |
//! | 6  | 4 | local DOS date/time ([`DosDateTime`]) |
//! | 10 | 8 | packed size |
//! | 18 | 8 | unpacked size |
//! | 26 | 2 | path length in UTF-16 code units |
//!
//! All integers are little-endian.

pub mod attributes;
pub mod dos_time;
pub mod header;

pub use attributes::Attributes;
pub use dos_time::DosDateTime;
pub use header::{EntryFlags, EntryHeader, decode_path, encode_path};

/// The file signature every archive starts with.
pub const FILE_SIGNATURE: &[u8; 8] = b"SMPA100A";

/// Length of [`FILE_SIGNATURE`] in bytes.
pub const FILE_SIGNATURE_SIZE: u64 = FILE_SIGNATURE.len() as u64;

/// Magic constant at the start of every entry header.
///
/// Repeated per entry so that a misaligned read is detected as corruption
/// instead of being parsed as garbage.
pub const ENTRY_MAGIC: u32 = 0x1743_C8F1;

/// Byte offset of the flags field within an entry header.
pub const FLAGS_OFFSET: u64 = 4;

/// Byte offset of the attributes field within an entry header.
pub const ATTRIBUTES_OFFSET: u64 = FLAGS_OFFSET + 1;

/// Byte offset of the timestamp field within an entry header.
pub const TIME_OFFSET: u64 = ATTRIBUTES_OFFSET + 1;

/// Byte offset of the packed size field within an entry header.
///
/// This is the only field rewritten after its entry has been streamed out.
pub const PACK_SIZE_OFFSET: u64 = TIME_OFFSET + 4;

/// Byte offset of the unpacked size field within an entry header.
pub const UNP_SIZE_OFFSET: u64 = PACK_SIZE_OFFSET + 8;

/// Byte offset of the path length field within an entry header.
pub const PATH_LEN_OFFSET: u64 = UNP_SIZE_OFFSET + 8;

/// Size of the fixed entry header in bytes.
pub const ENTRY_HEADER_SIZE: usize = PATH_LEN_OFFSET as usize + 2;

/// Maximum entry path length in UTF-16 code units.
pub const MAX_PATH_LEN: usize = 1023;

/// Size of each intermediate buffer used when streaming content (64 KiB).
pub const BUFFER_SIZE: usize = 0x10000;

/// Content smaller than this is always stored uncompressed.
pub const MIN_COMPRESS_SIZE: u64 = 16;

/// Separator used between components of paths stored in the archive.
pub const PATH_SEPARATOR: char = '\\';

const _: () = assert!(ENTRY_HEADER_SIZE == 28);
const _: () = assert!(PACK_SIZE_OFFSET == 10);

/// Returns whether content of the given size is stored deflate-compressed.
#[inline]
pub fn should_compress(size: u64) -> bool {
    size >= MIN_COMPRESS_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_offsets() {
        assert_eq!(FLAGS_OFFSET, 4);
        assert_eq!(ATTRIBUTES_OFFSET, 5);
        assert_eq!(TIME_OFFSET, 6);
        assert_eq!(PACK_SIZE_OFFSET, 10);
        assert_eq!(UNP_SIZE_OFFSET, 18);
        assert_eq!(PATH_LEN_OFFSET, 26);
    }

    #[test]
    fn test_compression_gate() {
        assert!(!should_compress(0));
        assert!(!should_compress(15));
        assert!(should_compress(16));
        assert!(should_compress(u64::MAX));
    }
}
