//! Entry attribute bits and their translation to and from the host filesystem.

use std::fs::Metadata;
use std::path::Path;

/// File or directory attributes as stored in an entry header.
///
/// The bit layout is the DOS attribute byte used by WCX hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attributes(u8);

impl Attributes {
    /// Read-only.
    pub const READ_ONLY: Self = Self(0x01);
    /// Hidden.
    pub const HIDDEN: Self = Self(0x02);
    /// System.
    pub const SYSTEM: Self = Self(0x04);
    /// Volume label (never produced when packing).
    pub const VOLUME_ID: Self = Self(0x08);
    /// Directory.
    pub const DIRECTORY: Self = Self(0x10);
    /// Archive.
    pub const ARCHIVE: Self = Self(0x20);

    /// Creates attributes from raw bits.
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

    /// Returns whether the directory bit is set.
    pub const fn is_directory(self) -> bool {
        self.contains(Self::DIRECTORY)
    }

    /// Returns whether the read-only bit is set.
    pub const fn is_read_only(self) -> bool {
        self.contains(Self::READ_ONLY)
    }

    /// Translates native Windows attribute flags.
    ///
    /// Bits without an archive counterpart are dropped.
    pub fn from_windows(native: u32) -> Self {
        const FILE_ATTRIBUTE_READONLY: u32 = 0x01;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x02;
        const FILE_ATTRIBUTE_SYSTEM: u32 = 0x04;
        const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
        const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;

        let mut attrs = Self::default();
        for (native_bit, bit) in [
            (FILE_ATTRIBUTE_READONLY, Self::READ_ONLY),
            (FILE_ATTRIBUTE_HIDDEN, Self::HIDDEN),
            (FILE_ATTRIBUTE_SYSTEM, Self::SYSTEM),
            (FILE_ATTRIBUTE_DIRECTORY, Self::DIRECTORY),
            (FILE_ATTRIBUTE_ARCHIVE, Self::ARCHIVE),
        ] {
            if native & native_bit != 0 {
                attrs.insert(bit);
            }
        }
        attrs
    }

    /// Derives attributes from filesystem metadata.
    #[cfg(windows)]
    pub fn from_metadata(_path: &Path, metadata: &Metadata) -> Self {
        use std::os::windows::fs::MetadataExt;
        Self::from_windows(metadata.file_attributes())
    }

    /// Derives attributes from filesystem metadata.
    ///
    /// Outside Windows there is no attribute word: read-only comes from the
    /// permissions and hidden from a leading dot in the file name.
    #[cfg(not(windows))]
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let mut attrs = Self::default();
        if metadata.is_dir() {
            attrs.insert(Self::DIRECTORY);
        }
        if metadata.permissions().readonly() {
            attrs.insert(Self::READ_ONLY);
        }
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') && n != "." && n != "..");
        if hidden {
            attrs.insert(Self::HIDDEN);
        }
        attrs
    }

    /// Applies the attributes to an extracted file or directory.
    ///
    /// Only the read-only bit is portable, and it is applied to files only:
    /// a read-only directory would block extracting its children on Unix.
    /// Failures are logged and ignored.
    pub fn apply(self, path: &Path) {
        if !self.is_read_only() || self.is_directory() {
            return;
        }
        match std::fs::metadata(path) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_readonly(true);
                if let Err(e) = std::fs::set_permissions(path, perms) {
                    log::warn!(
                        "Failed to set read-only attribute on '{}': {}",
                        path.display(),
                        e
                    );
                }
            }
            Err(e) => log::warn!("Failed to stat '{}': {}", path.display(), e),
        }
    }
}

impl std::fmt::Display for Attributes {
    /// Formats as `DARHS` letters with `-` for cleared bits.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (bit, letter) in [
            (Self::DIRECTORY, 'D'),
            (Self::ARCHIVE, 'A'),
            (Self::READ_ONLY, 'R'),
            (Self::HIDDEN, 'H'),
            (Self::SYSTEM, 'S'),
        ] {
            let c = if self.contains(bit) { letter } else { '-' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
