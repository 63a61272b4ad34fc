//! Exit codes for the CLI tool.

use smpa::{Error, ErrorKind};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings (or a probe did not match)
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    IoError,
    UserInterrupt,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::UserInterrupt => USER_INTERRUPT,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts an smpa error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error.kind() {
        ErrorKind::BadArchive | ErrorKind::BufferTooSmall => ExitCode::BadArchive,
        ErrorKind::ReadFailure
        | ErrorKind::WriteFailure
        | ErrorKind::SeekFailure
        | ErrorKind::OpenFailure
        | ErrorKind::CreateFailure => ExitCode::IoError,
        ErrorKind::AbortedByUser => ExitCode::UserInterrupt,
        ErrorKind::Unsupported => ExitCode::BadArgs,
        // Future error kinds - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
