//! Error types for SMPA archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when working with SMPA archives, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Failures
//! are never recovered locally: the first error unwinds to the operation
//! boundary through `?`.
//!
//! ```rust,no_run
//! use smpa::{ArchiveReader, OpenMode, Result};
//!
//! fn count_entries(path: &str) -> Result<usize> {
//!     let mut reader = ArchiveReader::open_path(path, OpenMode::List)?;
//!     let mut count = 0;
//!     while reader.next_entry()?.is_some() {
//!         reader.skip()?;
//!         count += 1;
//!     }
//!     Ok(count)
//! }
//! ```
//!
//! ## Exhaustive Error Matching
//!
//! ```rust,no_run
//! use smpa::{ArchiveReader, Error, OpenMode};
//!
//! match ArchiveReader::open_path("data.smpa", OpenMode::List) {
//!     Ok(_) => println!("opened"),
//!     Err(Error::Open { path, .. }) => eprintln!("cannot open {}", path.display()),
//!     Err(Error::BadArchive { offset, reason }) => {
//!         eprintln!("corrupt archive at byte {:#x}: {}", offset, reason)
//!     }
//!     Err(e) => eprintln!("error: {}", e),
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// Coarse classification of an [`Error`].
///
/// Each variant corresponds to one failure kind reported across the host
/// boundary (see [`crate::status::StatusCode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Structural, magic or size invariant violation.
    BadArchive,
    /// Reading from the archive or a source file failed.
    ReadFailure,
    /// Writing to the archive or a destination file failed.
    WriteFailure,
    /// Repositioning within the archive failed.
    SeekFailure,
    /// A source path could not be opened.
    OpenFailure,
    /// A destination path could not be created.
    CreateFailure,
    /// An entry path exceeds the maximum supported length.
    BufferTooSmall,
    /// The requested mode or operation is not recognized.
    Unsupported,
    /// The progress callback requested cancellation.
    AbortedByUser,
    /// File metadata could not be translated to the archive representation.
    UnknownFormat,
    /// Allocation failure or an unclassified failure.
    OutOfMemory,
}

/// The main error type for SMPA archive operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Format | [`BadArchive`][Self::BadArchive], [`PathTooLong`][Self::PathTooLong] | Damaged or foreign file |
/// | I/O | [`Read`][Self::Read], [`Write`][Self::Write], [`Seek`][Self::Seek] | Underlying stream failure |
/// | Paths | [`Open`][Self::Open], [`Create`][Self::Create] | Missing files, permissions |
/// | Control | [`Cancelled`][Self::Cancelled] | Progress callback returned `false` |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The archive is structurally invalid.
    ///
    /// Returned when a signature or entry magic does not match, when an
    /// entry header violates a size invariant, when compressed content does
    /// not decode to its declared size, or when the archive ends in the
    /// middle of an entry.
    ///
    /// # Recovery
    ///
    /// None. Entries before `offset` are usually still readable.
    #[error("Corrupt archive at offset {offset:#x}: {reason}")]
    BadArchive {
        /// Byte offset in the archive where the problem was detected.
        offset: u64,
        /// A description of the violated invariant.
        reason: String,
    },

    /// Reading data failed.
    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    /// Writing data failed.
    #[error("Write error: {0}")]
    Write(#[source] io::Error),

    /// Seeking within the archive failed.
    #[error("Seek error: {0}")]
    Seek(#[source] io::Error),

    /// A file could not be opened for reading.
    #[error("Cannot open '{}': {source}", path.display())]
    Open {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file or directory could not be created.
    #[error("Cannot create '{}': {source}", path.display())]
    Create {
        /// The path that failed to be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An entry path is longer than the format allows.
    ///
    /// Reported while reading an entry whose declared path length exceeds
    /// [`MAX_PATH_LEN`](crate::format::MAX_PATH_LEN), and while packing a path
    /// that would not fit.
    #[error("Path of {len} UTF-16 units exceeds the maximum of {max}")]
    PathTooLong {
        /// Length of the offending path in UTF-16 code units.
        len: usize,
        /// Maximum supported length.
        max: usize,
    },

    /// The requested mode or operation is not supported.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The operation was cancelled by the user.
    ///
    /// This error is returned when a progress callback returns `false`.
    /// Partially extracted files are removed before it is returned.
    #[error("Operation cancelled")]
    Cancelled,

    /// File metadata could not be represented in the archive.
    ///
    /// Typically a modification time outside the DOS date range.
    #[error("Unrepresentable metadata: {0}")]
    UnknownFormat(String),

    /// The codec could not allocate its state.
    #[error("Out of memory")]
    OutOfMemory,
}

impl Error {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadArchive { .. } => ErrorKind::BadArchive,
            Error::Read(_) => ErrorKind::ReadFailure,
            Error::Write(_) => ErrorKind::WriteFailure,
            Error::Seek(_) => ErrorKind::SeekFailure,
            Error::Open { .. } => ErrorKind::OpenFailure,
            Error::Create { .. } => ErrorKind::CreateFailure,
            Error::PathTooLong { .. } => ErrorKind::BufferTooSmall,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::Cancelled => ErrorKind::AbortedByUser,
            Error::UnknownFormat(_) => ErrorKind::UnknownFormat,
            Error::OutOfMemory => ErrorKind::OutOfMemory,
        }
    }

    /// Returns `true` if this error indicates a damaged archive.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::BadArchive { .. } | Error::PathTooLong { .. })
    }

    /// Returns `true` if the user cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Creates a BadArchive error.
    pub fn bad_archive(offset: u64, reason: impl Into<String>) -> Self {
        Error::BadArchive {
            offset,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for SMPA operations.
pub type Result<T> = std::result::Result<T, Error>;
