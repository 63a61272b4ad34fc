//! Entry header serialization.
//!
//! Pure conversion between [`EntryHeader`] and its on-disk bytes. No I/O
//! happens here; [`crate::context`] reads and writes the buffers.

use crate::{Error, Result};

use super::{
    ATTRIBUTES_OFFSET, Attributes, DosDateTime, ENTRY_HEADER_SIZE, ENTRY_MAGIC, FLAGS_OFFSET,
    MAX_PATH_LEN, PACK_SIZE_OFFSET, PATH_LEN_OFFSET, TIME_OFFSET, UNP_SIZE_OFFSET,
};

/// Per-entry flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryFlags(u8);

impl EntryFlags {
    /// The entry is a tombstone and must be skipped.
    pub const DELETED: Self = Self(0x01);
    /// The content is a zlib stream.
    pub const COMPRESSED: Self = Self(0x02);

    /// Creates flags from raw bits. Unknown bits are preserved.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns whether all bits of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets all bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns whether the entry is a tombstone.
    pub const fn is_deleted(self) -> bool {
        self.contains(Self::DELETED)
    }

    /// Returns whether the content is compressed.
    pub const fn is_compressed(self) -> bool {
        self.contains(Self::COMPRESSED)
    }
}

impl std::ops::BitOr for EntryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The fixed-size header preceding each entry's path and content.
///
/// The entry magic is not stored here: it is written by [`encode`](Self::encode)
/// and checked by [`decode`](Self::decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryHeader {
    /// Deleted / compressed bits.
    pub flags: EntryFlags,
    /// File or directory attributes.
    pub attributes: Attributes,
    /// Last modification time, local DOS format.
    pub time: DosDateTime,
    /// Number of content bytes stored in the archive.
    pub pack_size: u64,
    /// Original content size.
    pub unp_size: u64,
    /// Path length in UTF-16 code units.
    pub path_len: u16,
}

impl EntryHeader {
    /// Serializes the header, including the entry magic.
    pub fn encode(&self) -> [u8; ENTRY_HEADER_SIZE] {
        let mut buf = [0u8; ENTRY_HEADER_SIZE];
        buf[..4].copy_from_slice(&ENTRY_MAGIC.to_le_bytes());
        buf[FLAGS_OFFSET as usize] = self.flags.bits();
        buf[ATTRIBUTES_OFFSET as usize] = self.attributes.bits();
        put(&mut buf, TIME_OFFSET, &self.time.to_raw().to_le_bytes());
        put(&mut buf, PACK_SIZE_OFFSET, &self.pack_size.to_le_bytes());
        put(&mut buf, UNP_SIZE_OFFSET, &self.unp_size.to_le_bytes());
        put(&mut buf, PATH_LEN_OFFSET, &self.path_len.to_le_bytes());
        buf
    }

    /// Parses and validates a header.
    ///
    /// `offset` is the position of the header in the archive and is only used
    /// for error reporting.
    ///
    /// # Errors
    ///
    /// - [`Error::BadArchive`] if the entry magic does not match or the path
    ///   length is zero
    /// - [`Error::PathTooLong`] if the path length exceeds [`MAX_PATH_LEN`]
    pub fn decode(buf: &[u8; ENTRY_HEADER_SIZE], offset: u64) -> Result<Self> {
        let magic = u32::from_le_bytes(field(buf, 0));
        if magic != ENTRY_MAGIC {
            return Err(Error::bad_archive(
                offset,
                format!(
                    "entry magic mismatch: expected {:#010x}, got {:#010x}",
                    ENTRY_MAGIC, magic
                ),
            ));
        }

        let path_len = u16::from_le_bytes(field(buf, PATH_LEN_OFFSET));
        if path_len == 0 {
            return Err(Error::bad_archive(offset, "entry has an empty path"));
        }
        if usize::from(path_len) > MAX_PATH_LEN {
            return Err(Error::PathTooLong {
                len: usize::from(path_len),
                max: MAX_PATH_LEN,
            });
        }

        Ok(Self {
            flags: EntryFlags::from_bits(buf[FLAGS_OFFSET as usize]),
            attributes: Attributes::from_bits(buf[ATTRIBUTES_OFFSET as usize]),
            time: DosDateTime::from_raw(u32::from_le_bytes(field(buf, TIME_OFFSET))),
            pack_size: u64::from_le_bytes(field(buf, PACK_SIZE_OFFSET)),
            unp_size: u64::from_le_bytes(field(buf, UNP_SIZE_OFFSET)),
            path_len,
        })
    }

    /// Returns whether this entry describes a directory.
    pub fn is_directory(&self) -> bool {
        self.attributes.is_directory()
    }

    /// Checks the size invariants a live entry must satisfy.
    ///
    /// Directories carry no content, and stored (uncompressed) entries have
    /// identical packed and unpacked sizes.
    pub fn validate(&self, offset: u64) -> Result<()> {
        if self.is_directory() && (self.pack_size != 0 || self.unp_size != 0) {
            return Err(Error::bad_archive(
                offset,
                format!(
                    "directory entry with content (packed {}, unpacked {})",
                    self.pack_size, self.unp_size
                ),
            ));
        }
        if !self.flags.is_compressed() && self.pack_size != self.unp_size {
            return Err(Error::bad_archive(
                offset,
                format!(
                    "stored entry size mismatch (packed {}, unpacked {})",
                    self.pack_size, self.unp_size
                ),
            ));
        }
        Ok(())
    }
}

fn put(buf: &mut [u8], offset: u64, bytes: &[u8]) {
    let start = offset as usize;
    buf[start..start + bytes.len()].copy_from_slice(bytes);
}

fn field<const N: usize>(buf: &[u8; ENTRY_HEADER_SIZE], offset: u64) -> [u8; N] {
    let start = offset as usize;
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[start..start + N]);
    out
}

/// Encodes an archive path as UTF-16LE bytes.
///
/// # Errors
///
/// Returns [`Error::PathTooLong`] if the path does not fit and
/// [`Error::Unsupported`] for an empty path.
pub fn encode_path(path: &str) -> Result<Vec<u8>> {
    let units: Vec<u16> = path.encode_utf16().collect();
    if units.is_empty() {
        return Err(Error::Unsupported("empty archive path".into()));
    }
    if units.len() > MAX_PATH_LEN {
        return Err(Error::PathTooLong {
            len: units.len(),
            max: MAX_PATH_LEN,
        });
    }
    Ok(units.iter().flat_map(|u| u.to_le_bytes()).collect())
}

/// Decodes UTF-16LE path bytes read from the archive.
pub fn decode_path(bytes: &[u8], offset: u64) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::bad_archive(offset, "odd path byte count"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| Error::bad_archive(offset, "entry path is not valid UTF-16"))
}
