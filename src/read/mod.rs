//! Archive reading: listing and extraction.
//!
//! An [`ArchiveReader`] walks the archive front to back. Each call to
//! [`next_entry`](ArchiveReader::next_entry) yields the next live entry, and
//! its content is then either skipped or extracted with
//! [`process`](ArchiveReader::process). Tombstoned entries are skipped
//! transparently.
//!
//! # Example
//!
//! ```rust,no_run
//! use smpa::{ArchiveReader, OpenMode, ProcessOp};
//!
//! let mut reader = ArchiveReader::open_path("data.smpa", OpenMode::Extract)?;
//! while let Some(entry) = reader.next_entry()? {
//!     if entry.path.ends_with(".txt") {
//!         reader.process(&ProcessOp::Extract(entry.name().into()))?;
//!     } else {
//!         reader.skip()?;
//!     }
//! }
//! # Ok::<(), smpa::Error>(())
//! ```

mod entry;
mod extraction;
mod metadata;

pub use entry::EntryInfo;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::context::ArchiveContext;
use crate::options::{OpenMode, ProcessOp, SessionOptions};
use crate::progress::{Progress, ProgressCallback};
use crate::{Error, Result};

/// Sequential reader over an archive.
pub struct ArchiveReader<R = BufReader<File>> {
    ctx: ArchiveContext<R>,
    mode: OpenMode,
    pending: bool,
}

impl<R> std::fmt::Debug for ArchiveReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("mode", &self.mode)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl ArchiveReader<BufReader<File>> {
    /// Opens an archive file with default session options.
    pub fn open_path(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_path_with(path, mode, SessionOptions::default())
    }

    /// Opens an archive file.
    ///
    /// # Errors
    ///
    /// - [`Error::Open`] if the file cannot be opened
    /// - [`Error::BadArchive`] if it does not start with the archive signature
    /// - [`Error::Cancelled`] if the progress callback cancels
    pub fn open_path_with(
        path: impl AsRef<Path>,
        mode: OpenMode,
        options: SessionOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut progress = Progress::new(options.callback, options.progress_interval);
        progress.tick()?;
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Opened '{}' for {:?}", path.display(), mode);
        Self::with_progress(BufReader::new(file), mode, progress)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Wraps an archive stream.
    pub fn from_reader(reader: R, mode: OpenMode, options: SessionOptions) -> Result<Self> {
        let progress = Progress::new(options.callback, options.progress_interval);
        Self::with_progress(reader, mode, progress)
    }

    fn with_progress(reader: R, mode: OpenMode, progress: Progress) -> Result<Self> {
        let mut ctx = ArchiveContext::open(reader, progress)?;
        ctx.progress().tick()?;
        ctx.validate_file_header()?;
        ctx.progress().tick()?;
        Ok(Self {
            ctx,
            mode,
            pending: false,
        })
    }

    /// The mode the archive was opened in.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Installs a session callback on an open archive, replacing any set
    /// through [`SessionOptions`].
    pub fn set_callback(&mut self, callback: impl ProgressCallback + 'static) {
        self.ctx.progress().set_callback(Some(Box::new(callback)));
    }

    /// Advances to the next live entry.
    ///
    /// Returns `Ok(None)` at the end of the archive. If the previous entry was
    /// not processed, its content is skipped first.
    ///
    /// # Errors
    ///
    /// [`Error::BadArchive`] if the entry is damaged or violates a size
    /// invariant (a directory with content, or a stored entry whose packed and
    /// unpacked sizes differ).
    pub fn next_entry(&mut self) -> Result<Option<EntryInfo>> {
        if self.pending {
            self.skip()?;
        }
        loop {
            if !self.ctx.read_next_entry_header()? {
                return Ok(None);
            }
            self.ctx.progress().tick()?;
            if !self.ctx.header().flags.is_deleted() {
                break;
            }
            self.ctx.skip_content()?;
            self.ctx.progress().tick()?;
        }

        let offset = self.ctx.entry_start();
        self.ctx.header().validate(offset)?;
        self.pending = true;
        Ok(Some(EntryInfo::from_header(
            self.ctx.header(),
            self.ctx.path(),
            offset,
        )))
    }

    /// Skips the content of the current entry.
    pub fn skip(&mut self) -> Result<()> {
        self.process(&ProcessOp::Skip)
    }

    /// Extracts the current entry to `dest`.
    pub fn extract_to(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        self.process(&ProcessOp::Extract(dest.as_ref().to_path_buf()))
    }

    /// Applies `op` to the entry last returned by
    /// [`next_entry`](Self::next_entry).
    ///
    /// Skip and test move past the content without decoding it. Extract
    /// creates the directory or file and restores its metadata.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] if there is no current entry, or when
    ///   extracting from an archive opened with [`OpenMode::List`]
    /// - [`Error::Create`] if the destination cannot be created
    /// - [`Error::Cancelled`] if the progress callback cancels; a partially
    ///   written file is removed first
    pub fn process(&mut self, op: &ProcessOp) -> Result<()> {
        if !self.pending {
            return Err(Error::Unsupported("no current entry to process".into()));
        }
        match op {
            ProcessOp::Skip | ProcessOp::Test => {
                self.pending = false;
                self.ctx.skip_content()?;
                self.ctx.progress().tick()
            }
            ProcessOp::Extract(dest) => {
                if self.mode != OpenMode::Extract {
                    return Err(Error::Unsupported(
                        "archive was opened for listing".into(),
                    ));
                }
                self.pending = false;
                extraction::extract_current(&mut self.ctx, dest)
            }
        }
    }

    /// Lists all remaining live entries.
    pub fn entries(&mut self) -> Result<Vec<EntryInfo>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            self.skip()?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Consumes the reader and returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.ctx.into_inner()
    }
}
