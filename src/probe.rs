//! Content-based format detection.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::context::ArchiveContext;
use crate::progress::Progress;

/// Returns whether `path` starts with the archive signature.
///
/// Only the signature is examined. Unreadable, short or foreign files yield
/// `false`, never an error.
pub fn can_handle_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => is_archive(file),
        Err(e) => {
            log::debug!("Cannot probe '{}': {}", path.display(), e);
            false
        }
    }
}

/// Returns whether `reader` passes the same file header validation an
/// archive session performs on open.
pub fn is_archive<R: Read + Seek>(reader: R) -> bool {
    let result = ArchiveContext::open(reader, Progress::default())
        .and_then(|mut ctx| ctx.validate_file_header());
    if let Err(e) = &result {
        log::debug!("Not an archive: {}", e);
    }
    result.is_ok()
}
