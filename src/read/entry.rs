//! Archive entry listing records.

use std::time::SystemTime;

use crate::format::{Attributes, DosDateTime, EntryHeader};
use crate::paths;

/// A live (non-deleted) entry as returned by
/// [`ArchiveReader::next_entry`](super::ArchiveReader::next_entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Path inside the archive, components separated by `\`.
    pub path: String,
    /// File or directory attributes.
    pub attributes: Attributes,
    /// Last modification time (local DOS format).
    pub time: DosDateTime,
    /// Bytes of content stored in the archive.
    pub pack_size: u64,
    /// Original size of the content.
    pub unp_size: u64,
    /// Whether the content is deflate-compressed.
    pub compressed: bool,
    /// Offset of the entry header within the archive.
    pub offset: u64,
}

impl EntryInfo {
    pub(crate) fn from_header(header: &EntryHeader, path: &str, offset: u64) -> Self {
        Self {
            path: path.to_string(),
            attributes: header.attributes,
            time: header.time,
            pack_size: header.pack_size,
            unp_size: header.unp_size,
            compressed: header.flags.is_compressed(),
            offset,
        }
    }

    /// Returns whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.attributes.is_directory()
    }

    /// Returns the last path component.
    pub fn name(&self) -> &str {
        paths::file_name(&self.path)
    }

    /// Returns the modification time, if the stored value is a valid date.
    pub fn modified(&self) -> Option<SystemTime> {
        self.time.to_system_time()
    }

    /// Returns the packed size as a fraction of the original size.
    ///
    /// Empty entries report a ratio of 1.0.
    pub fn ratio(&self) -> f64 {
        if self.unp_size == 0 {
            1.0
        } else {
            self.pack_size as f64 / self.unp_size as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::EntryFlags;

    #[test]
    fn test_from_header() {
        let header = EntryHeader {
            flags: EntryFlags::COMPRESSED,
            attributes: Attributes::ARCHIVE,
            time: DosDateTime::from_raw(0x5A21_6C3D),
            pack_size: 25,
            unp_size: 100,
            path_len: 9,
        };
        let info = EntryInfo::from_header(&header, "dir\\a.txt", 8);
        assert_eq!(info.name(), "a.txt");
        assert!(info.compressed);
        assert!(!info.is_directory());
        assert_eq!(info.ratio(), 0.25);
        assert!(info.modified().is_some());
        assert_eq!(info.time.to_string(), "2025-01-01 13:33:58");
    }
}
