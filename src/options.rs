//! Session and packing configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressCallback};
use crate::{Error, Result};

/// Host flags controlling a pack operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackFlags(u32);

impl PackFlags {
    /// Delete source files and directories after they were packed.
    pub const MOVE_FILES: Self = Self(0x01);
    /// Preserve the directory structure. When clear, only files are packed,
    /// all on one level under the sub-path.
    pub const SAVE_PATHS: Self = Self(0x02);

    /// Creates flags from a host bitmask. Unknown bits are ignored.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & (Self::MOVE_FILES.0 | Self::SAVE_PATHS.0))
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether all bits of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether sources are deleted after packing.
    pub const fn move_files(self) -> bool {
        self.contains(Self::MOVE_FILES)
    }

    /// Returns whether directory structure is preserved.
    pub const fn save_paths(self) -> bool {
        self.contains(Self::SAVE_PATHS)
    }
}

impl std::ops::BitOr for PackFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Options for packing files into an archive.
///
/// # Example
///
/// ```rust
/// use smpa::{PackFlags, PackOptions};
///
/// let options = PackOptions::new()
///     .save_paths(true)
///     .level(9);
/// assert!(options.flags.save_paths());
/// assert_eq!(options.level, 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    /// Host pack flags.
    pub flags: PackFlags,
    /// Deflate level (0-9).
    pub level: u32,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            flags: PackFlags::default(),
            level: 6,
        }
    }
}

impl PackOptions {
    /// Creates pack options with defaults: flatten, keep sources, level 6.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all flags.
    pub fn flags(mut self, flags: PackFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets or clears [`PackFlags::SAVE_PATHS`].
    pub fn save_paths(mut self, enabled: bool) -> Self {
        self.flags = self.with_bit(PackFlags::SAVE_PATHS, enabled);
        self
    }

    /// Sets or clears [`PackFlags::MOVE_FILES`].
    pub fn move_files(mut self, enabled: bool) -> Self {
        self.flags = self.with_bit(PackFlags::MOVE_FILES, enabled);
        self
    }

    /// Sets the deflate level, clamping values above 9.
    pub fn level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    fn with_bit(&self, bit: PackFlags, enabled: bool) -> PackFlags {
        if enabled {
            PackFlags(self.flags.0 | bit.0)
        } else {
            PackFlags(self.flags.0 & !bit.0)
        }
    }
}

/// Per-session options: progress callback and throttle interval.
pub struct SessionOptions {
    /// Minimum time between throttled progress notifications.
    pub progress_interval: Duration,
    /// Callback for this session. When `None` the process-wide default from
    /// [`set_default_callback`](crate::progress::set_default_callback) is used.
    pub callback: Option<Box<dyn ProgressCallback>>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            callback: None,
        }
    }
}

impl std::fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOptions")
            .field("progress_interval", &self.progress_interval)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl SessionOptions {
    /// Creates session options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a per-session progress callback.
    pub fn callback(mut self, callback: impl ProgressCallback + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Sets the progress throttle interval.
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// How an archive is opened for reading. Fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Entries are listed; content is only skipped.
    List,
    /// Entries may be extracted.
    Extract,
}

impl OpenMode {
    /// Decodes a host open mode: 0 lists, 1 extracts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for any other value.
    pub fn from_host(mode: i32) -> Result<Self> {
        match mode {
            0 => Ok(OpenMode::List),
            1 => Ok(OpenMode::Extract),
            other => Err(Error::Unsupported(format!("open mode {}", other))),
        }
    }
}

/// What to do with the current entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOp {
    /// Skip the content.
    Skip,
    /// Skip the content (no verification is performed).
    Test,
    /// Extract to the given filesystem path.
    Extract(PathBuf),
}

impl ProcessOp {
    /// Decodes a host operation: 0 skips, 1 tests, 2 extracts.
    ///
    /// The extraction destination is `dest_name` placed under `dest_path`;
    /// either may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for any other operation.
    pub fn from_host(operation: i32, dest_path: &str, dest_name: &str) -> Result<Self> {
        match operation {
            0 => Ok(ProcessOp::Skip),
            1 => Ok(ProcessOp::Test),
            2 => Ok(ProcessOp::Extract(crate::paths::combine_native(
                Path::new(dest_path),
                dest_name,
            ))),
            other => Err(Error::Unsupported(format!("operation {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_flags() {
        let flags = PackFlags::from_bits(0x03 | 0x80);
        assert_eq!(flags.bits(), 0x03);
        assert!(flags.move_files());
        assert!(flags.save_paths());
        assert!(!PackFlags::default().save_paths());
        assert_eq!(PackFlags::MOVE_FILES | PackFlags::SAVE_PATHS, flags);
    }

    #[test]
    fn test_pack_options_builder() {
        let options = PackOptions::new().save_paths(true).move_files(true);
        assert!(options.flags.save_paths());
        assert!(options.flags.move_files());
        let options = options.save_paths(false).level(42);
        assert!(!options.flags.save_paths());
        assert!(options.flags.move_files());
        assert_eq!(options.level, 9);
    }

    #[test]
    fn test_open_mode_from_host() {
        assert_eq!(OpenMode::from_host(0).unwrap(), OpenMode::List);
        assert_eq!(OpenMode::from_host(1).unwrap(), OpenMode::Extract);
        assert!(matches!(OpenMode::from_host(2), Err(Error::Unsupported(_))));
        assert!(OpenMode::from_host(-1).is_err());
    }

    #[test]
    fn test_process_op_from_host() {
        assert_eq!(ProcessOp::from_host(0, "", "").unwrap(), ProcessOp::Skip);
        assert_eq!(ProcessOp::from_host(1, "", "").unwrap(), ProcessOp::Test);
        assert_eq!(
            ProcessOp::from_host(2, "out", "a.txt").unwrap(),
            ProcessOp::Extract(Path::new("out").join("a.txt"))
        );
        assert_eq!(
            ProcessOp::from_host(2, "", "a.txt").unwrap(),
            ProcessOp::Extract(PathBuf::from("a.txt"))
        );
        assert!(ProcessOp::from_host(7, "", "").is_err());
    }

    #[test]
    fn test_session_options_debug() {
        let options = SessionOptions::new().callback(crate::progress::NoProgress);
        let text = format!("{:?}", options);
        assert!(text.contains("has_callback: true"));
        assert_eq!(options.progress_interval, Duration::from_millis(40));
    }
}
