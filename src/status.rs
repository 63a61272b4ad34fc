//! Status codes reported across the host boundary.
//!
//! Hosts that drive the archive through a C-style plugin interface expect a
//! single integer per call. This module converts [`Result`]s into those
//! codes. The numbering matches the WCX packer plugin interface.

use crate::error::{Error, ErrorKind};

/// Integer status reported to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    /// Success.
    Ok = 0,
    /// No more entries in the archive.
    EndArchive = 10,
    /// Out of memory, also used for unclassified failures.
    NoMemory = 11,
    /// Archive structure is invalid.
    BadArchive = 13,
    /// Metadata could not be translated.
    UnknownFormat = 14,
    /// Cannot open an existing file.
    OpenFailure = 15,
    /// Cannot create a file.
    CreateFailure = 16,
    /// Read error.
    ReadFailure = 18,
    /// Write error.
    WriteFailure = 19,
    /// Buffer too small for the entry path.
    SmallBuffer = 20,
    /// The user aborted the operation.
    Aborted = 21,
    /// Operation or seek not supported.
    NotSupported = 24,
}

impl StatusCode {
    /// Returns the numeric value passed to the host.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ErrorKind> for StatusCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::BadArchive => StatusCode::BadArchive,
            ErrorKind::ReadFailure => StatusCode::ReadFailure,
            ErrorKind::WriteFailure => StatusCode::WriteFailure,
            // Seek failures surface as "not supported", like a non-seekable stream.
            ErrorKind::SeekFailure => StatusCode::NotSupported,
            ErrorKind::OpenFailure => StatusCode::OpenFailure,
            ErrorKind::CreateFailure => StatusCode::CreateFailure,
            ErrorKind::BufferTooSmall => StatusCode::SmallBuffer,
            ErrorKind::Unsupported => StatusCode::NotSupported,
            ErrorKind::AbortedByUser => StatusCode::Aborted,
            ErrorKind::UnknownFormat => StatusCode::UnknownFormat,
            ErrorKind::OutOfMemory => StatusCode::NoMemory,
        }
    }
}

impl From<&Error> for StatusCode {
    fn from(error: &Error) -> Self {
        error.kind().into()
    }
}

/// Converts the outcome of a whole operation into a status code.
pub fn status_of<T>(result: &crate::Result<T>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::Ok,
        Err(e) => e.into(),
    }
}

/// Converts the outcome of an entry iteration step into a status code.
///
/// `Ok(None)` means the archive is exhausted and maps to
/// [`StatusCode::EndArchive`].
pub fn status_of_next<T>(result: &crate::Result<Option<T>>) -> StatusCode {
    match result {
        Ok(Some(_)) => StatusCode::Ok,
        Ok(None) => StatusCode::EndArchive,
        Err(e) => e.into(),
    }
}
