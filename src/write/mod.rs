//! Packing files into an archive.
//!
//! [`pack_files`] appends entries to an existing archive or creates a new
//! one. Entries already in the archive under a path that is about to be
//! written are tombstoned first, so the newly appended entry replaces them.
//!
//! # Example
//!
//! ```rust,no_run
//! use smpa::{PackOptions, SessionOptions, pack_files};
//!
//! let summary = pack_files(
//!     "backup.smpa",
//!     "",
//!     "/home/user/project",
//!     &["src\\", "src\\main.rs", "Cargo.toml"],
//!     &PackOptions::new().save_paths(true),
//!     SessionOptions::default(),
//! )?;
//! println!("{} entries written", summary.entries_written);
//! # Ok::<(), smpa::Error>(())
//! ```

mod add_list;
mod entry;

pub use add_list::{PackItem, ReplaceSet, plan};
pub use entry::PackedEntry;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use crate::context::ArchiveContext;
use crate::format::FILE_SIGNATURE;
use crate::options::{PackOptions, SessionOptions};
use crate::paths;
use crate::progress::{Progress, ProgressAmount, percent};
use crate::{Error, Result};

/// Outcome of a pack operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackSummary {
    /// Whether a new archive file was created.
    pub created: bool,
    /// Number of existing entries tombstoned because they were replaced.
    pub replaced: usize,
    /// Number of entries appended.
    pub entries_written: usize,
    /// Total source bytes read.
    pub bytes_read: u64,
    /// Total content bytes written.
    pub bytes_written: u64,
}

/// Packs `add_list` from `src_root` into `archive` under `sub_path`.
///
/// Each add-list item is a path relative to `src_root`, with either
/// separator style. Items ending in a separator are directories and are only
/// stored when [`PackFlags::SAVE_PATHS`](crate::PackFlags::SAVE_PATHS) is
/// set.
///
/// # Errors
///
/// - [`Error::Create`] if the archive can be neither opened nor created
/// - [`Error::BadArchive`] if an existing archive is damaged
/// - [`Error::Read`] / [`Error::Open`] for unreadable sources
/// - [`Error::Cancelled`] if the progress callback cancels
///
/// A failure after the first entry was started leaves the archive with a
/// valid prefix followed by a possibly incomplete final entry, which later
/// reads report as [`Error::BadArchive`].
pub fn pack_files<S: AsRef<str>>(
    archive: impl AsRef<Path>,
    sub_path: &str,
    src_root: impl AsRef<Path>,
    add_list: &[S],
    options: &PackOptions,
    session: SessionOptions,
) -> Result<PackSummary> {
    let archive = archive.as_ref();
    let src_root = src_root.as_ref();
    let mut progress = Progress::new(session.callback, session.progress_interval);
    progress.report(
        Some(&archive.display().to_string()),
        ProgressAmount::Bytes(0),
    )?;

    let save_paths = options.flags.save_paths();
    let items = plan(add_list, sub_path, save_paths);

    let (file, created) = open_for_pack(archive)?;
    let mut summary = PackSummary {
        created,
        ..PackSummary::default()
    };
    let mut ctx = if created {
        let mut ctx = ArchiveContext::create(file, progress);
        ctx.file_mut()
            .write_all(FILE_SIGNATURE)
            .map_err(Error::Write)?;
        ctx
    } else {
        let mut ctx = ArchiveContext::open(file, progress)?;
        ctx.validate_file_header()?;
        let replace = ReplaceSet::new(&items);
        summary.replaced = ctx.scan_and_mark(|_, path| replace.contains(path))?;
        ctx.file_mut()
            .seek(SeekFrom::End(0))
            .map_err(Error::Seek)?;
        ctx
    };
    log::debug!(
        "Packing {} item(s) into '{}' ({})",
        items.len(),
        archive.display(),
        if created { "new" } else { "existing" }
    );

    let mut directories = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let source = paths::combine_native(src_root, &item.relative);
        let (file, progress) = ctx.parts_mut();
        progress.tick_with(
            Some(&source.display().to_string()),
            ProgressAmount::Percent(percent(i as u64, items.len() as u64)),
        )?;
        let packed = entry::pack_entry(file, progress, &source, &item.archive_path, options.level)?;
        directories.push(packed.is_directory);
        summary.entries_written += 1;
        summary.bytes_read += packed.unp_size;
        summary.bytes_written += packed.pack_size;
    }
    ctx.file_mut().flush().map_err(Error::Write)?;
    drop(ctx);

    if options.flags.move_files() {
        for (item, is_directory) in items.iter().zip(directories).rev() {
            let source = paths::combine_native(src_root, &item.relative);
            remove_source(&source, is_directory)?;
        }
    }
    Ok(summary)
}

/// Opens `path` for update, creating it if it cannot be opened.
fn open_for_pack(path: &Path) -> Result<(File, bool)> {
    if let Ok(file) = OpenOptions::new().read(true).write(true).open(path) {
        return Ok((file, false));
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| Error::Create {
            path: path.to_path_buf(),
            source,
        })?;
    Ok((file, true))
}

fn remove_source(path: &Path, is_directory: bool) -> Result<()> {
    let result = if is_directory {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| {
        Error::Write(io::Error::new(
            e.kind(),
            format!("cannot remove '{}': {}", path.display(), e),
        ))
    })?;
    log::debug!("Removed source '{}'", path.display());
    Ok(())
}
