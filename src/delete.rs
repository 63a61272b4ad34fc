//! Deleting entries by tombstoning them in place.
//!
//! Nothing is ever removed from the file. Each matching entry has its deleted
//! flag set, so the archive never shrinks. Deleting a directory path also
//! deletes every entry nested under it.

use std::fs::OpenOptions;
use std::path::Path;

use crate::context::ArchiveContext;
use crate::options::SessionOptions;
use crate::paths;
use crate::progress::{Progress, ProgressAmount};
use crate::{Error, Result};

/// A normalized, sorted set of archive paths to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSet(Vec<String>);

impl DeleteSet {
    /// Normalizes and sorts a host delete-list.
    ///
    /// A trailing `*.*` wildcard and one trailing separator are stripped from
    /// each item before it is case-folded.
    pub fn new<S: AsRef<str>>(items: &[S]) -> Self {
        let mut folded: Vec<String> = items
            .iter()
            .map(|item| {
                let item = item.as_ref();
                let item = item.strip_suffix("*.*").unwrap_or(item);
                paths::fold_case(&paths::to_archive_separators(
                    paths::strip_trailing_separator(item),
                ))
            })
            .filter(|item| !item.is_empty())
            .collect();
        folded.sort();
        folded.dedup();
        Self(folded)
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether `entry_path` or any of its ancestors is in the set.
    pub fn should_delete(&self, entry_path: &str) -> bool {
        let folded = paths::fold_case(&paths::to_archive_separators(entry_path));
        let mut current = folded.as_str();
        while !current.is_empty() {
            if self.0.binary_search_by(|p| p.as_str().cmp(current)).is_ok() {
                return true;
            }
            current = paths::up_dir(current);
        }
        false
    }
}

/// Tombstones every entry in `archive` named by `delete_list`.
///
/// Returns the number of entries marked. An empty delete-list succeeds
/// without opening the archive.
///
/// # Errors
///
/// - [`Error::Create`] if the archive cannot be opened for update
/// - [`Error::BadArchive`] if the archive is damaged
/// - [`Error::Cancelled`] if the progress callback cancels; entries already
///   marked stay marked and the archive remains readable
pub fn delete_files<S: AsRef<str>>(
    archive: impl AsRef<Path>,
    delete_list: &[S],
    session: SessionOptions,
) -> Result<usize> {
    let archive = archive.as_ref();
    let mut progress = Progress::new(session.callback, session.progress_interval);
    progress.report(
        Some(&archive.display().to_string()),
        ProgressAmount::Bytes(0),
    )?;

    let targets = DeleteSet::new(delete_list);
    if targets.is_empty() {
        return Ok(0);
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(archive)
        .map_err(|source| Error::Create {
            path: archive.to_path_buf(),
            source,
        })?;
    let mut ctx = ArchiveContext::open(file, progress)?;
    ctx.validate_file_header()?;
    let marked = ctx.scan_and_mark(|_, path| targets.should_delete(path))?;
    log::debug!("Deleted {} entries from '{}'", marked, archive.display());
    Ok(marked)
}
