//! The archive context shared by every session kind.
//!
//! [`ArchiveContext`] owns the archive stream together with the cursor and
//! progress state, and caches the most recently parsed entry header and path.
//! Reader, writer and deleter wrap it instead of sharing a base type.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::format::{
    ENTRY_HEADER_SIZE, EntryFlags, EntryHeader, FILE_SIGNATURE, FILE_SIGNATURE_SIZE, FLAGS_OFFSET,
    decode_path,
};
use crate::progress::{Progress, ProgressAmount, percent};
use crate::{Error, Result};

/// Open archive stream plus per-session cursor, progress and entry cache.
#[derive(Debug)]
pub struct ArchiveContext<F> {
    file: F,
    original_size: u64,
    progress: Progress,
    header: EntryHeader,
    path: String,
    entry_start: u64,
}

impl<F: Read + Seek> ArchiveContext<F> {
    /// Wraps an existing archive stream.
    ///
    /// Records the stream length as the original archive size and rewinds to
    /// the start.
    pub fn open(mut file: F, progress: Progress) -> Result<Self> {
        let original_size = file.seek(SeekFrom::End(0)).map_err(Error::Seek)?;
        file.seek(SeekFrom::Start(0)).map_err(Error::Seek)?;
        Ok(Self::with_size(file, progress, original_size))
    }

    /// Wraps a freshly created, empty archive stream.
    pub fn create(file: F, progress: Progress) -> Self {
        Self::with_size(file, progress, 0)
    }

    fn with_size(file: F, progress: Progress, original_size: u64) -> Self {
        Self {
            file,
            original_size,
            progress,
            header: EntryHeader::default(),
            path: String::new(),
            entry_start: 0,
        }
    }

    /// Size of the archive when the session opened it.
    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    /// The most recently read entry header.
    pub fn header(&self) -> &EntryHeader {
        &self.header
    }

    /// The path of the most recently read entry.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Offset of the most recently read entry header.
    pub fn entry_start(&self) -> u64 {
        self.entry_start
    }

    /// Offset of the first content byte of the most recently read entry.
    pub fn content_start(&self) -> u64 {
        self.entry_start + ENTRY_HEADER_SIZE as u64 + u64::from(self.header.path_len) * 2
    }

    /// Mutable access to the progress state.
    pub fn progress(&mut self) -> &mut Progress {
        &mut self.progress
    }

    /// Mutable access to the archive stream.
    pub fn file_mut(&mut self) -> &mut F {
        &mut self.file
    }

    /// Splits the borrow into the stream and progress state.
    pub fn parts_mut(&mut self) -> (&mut F, &mut Progress) {
        (&mut self.file, &mut self.progress)
    }

    /// Consumes the context and returns the stream.
    pub fn into_inner(self) -> F {
        self.file
    }

    /// Current stream position.
    pub fn position(&mut self) -> Result<u64> {
        self.file.stream_position().map_err(Error::Seek)
    }

    /// Reads and checks the file signature.
    ///
    /// # Errors
    ///
    /// [`Error::BadArchive`] if the stream is shorter than the signature or
    /// the bytes differ.
    pub fn validate_file_header(&mut self) -> Result<()> {
        let mut signature = [0u8; FILE_SIGNATURE.len()];
        self.file.read_exact(&mut signature).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::bad_archive(0, "file is shorter than the archive signature")
            } else {
                Error::Read(e)
            }
        })?;
        if &signature != FILE_SIGNATURE {
            return Err(Error::bad_archive(0, "archive signature mismatch"));
        }
        self.progress.add_bytes(FILE_SIGNATURE_SIZE);
        Ok(())
    }

    /// Reads the next entry header and its path, tombstones included.
    ///
    /// Returns `Ok(false)` at a clean end of the archive, that is when no byte
    /// of a further header exists. Content is not skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::BadArchive`] for a bad magic, an empty path, a partial
    ///   header or path, or content extending past the end of the archive
    /// - [`Error::PathTooLong`] if the declared path is too long
    pub fn read_next_entry_header(&mut self) -> Result<bool> {
        self.entry_start = self.position()?;
        self.header = EntryHeader::default();
        self.path.clear();

        let mut buf = [0u8; ENTRY_HEADER_SIZE];
        let filled = read_full(&mut self.file, &mut buf).map_err(Error::Read)?;
        if filled == 0 {
            return Ok(false);
        }
        if filled < ENTRY_HEADER_SIZE {
            return Err(Error::bad_archive(
                self.entry_start,
                format!("truncated entry header ({} of {} bytes)", filled, ENTRY_HEADER_SIZE),
            ));
        }
        let header = EntryHeader::decode(&buf, self.entry_start)?;
        self.progress.add_bytes(ENTRY_HEADER_SIZE as u64);

        let mut path_bytes = vec![0u8; usize::from(header.path_len) * 2];
        let filled = read_full(&mut self.file, &mut path_bytes).map_err(Error::Read)?;
        if filled < path_bytes.len() {
            return Err(Error::bad_archive(self.entry_start, "truncated entry path"));
        }
        self.path = decode_path(&path_bytes, self.entry_start)?;
        self.progress.add_bytes(path_bytes.len() as u64);
        self.header = header;

        let content_end = self
            .content_start()
            .checked_add(header.pack_size)
            .filter(|end| *end <= self.original_size);
        if content_end.is_none() {
            return Err(Error::bad_archive(
                self.entry_start,
                format!(
                    "entry content of {} bytes extends past the end of the archive",
                    header.pack_size
                ),
            ));
        }
        Ok(true)
    }

    /// Seeks past the content of the current entry.
    pub fn skip_content(&mut self) -> Result<()> {
        let pack_size = self.header.pack_size;
        if pack_size == 0 {
            return Ok(());
        }
        let end = self.content_start() + pack_size;
        self.file.seek(SeekFrom::Start(end)).map_err(Error::Seek)?;
        self.progress.add_bytes(pack_size);
        Ok(())
    }
}

impl<F: Read + Write + Seek> ArchiveContext<F> {
    /// Tombstones every live entry matching `predicate`.
    ///
    /// Walks all entries from the current position to the end of the
    /// archive. A match is marked by rewriting only its flags byte, so a
    /// cancelled scan leaves every header intact. Progress is reported as the
    /// percentage of the original archive size scanned.
    ///
    /// Returns the number of entries marked.
    pub fn scan_and_mark<P>(&mut self, mut predicate: P) -> Result<usize>
    where
        P: FnMut(&EntryHeader, &str) -> bool,
    {
        let mut marked = 0;
        loop {
            if !self.read_next_entry_header()? {
                return Ok(marked);
            }
            if self.header.flags.is_deleted() {
                self.skip_content()?;
                continue;
            }

            if predicate(&self.header, &self.path) {
                self.mark_deleted()?;
                marked += 1;
            }
            self.skip_content()?;

            let done = percent(self.entry_start, self.original_size);
            self.progress
                .tick_with(None, ProgressAmount::Percent(done))?;
        }
    }

    /// Sets the deleted bit of the current entry in place.
    ///
    /// Leaves the cursor at the start of the entry's content.
    fn mark_deleted(&mut self) -> Result<()> {
        let flags = self.header.flags | EntryFlags::DELETED;
        self.file
            .seek(SeekFrom::Start(self.entry_start + FLAGS_OFFSET))
            .map_err(Error::Seek)?;
        self.file
            .write_all(&[flags.bits()])
            .map_err(Error::Write)?;
        self.file
            .seek(SeekFrom::Start(self.content_start()))
            .map_err(Error::Seek)?;
        log::debug!("Tombstoned '{}' at offset {:#x}", self.path, self.entry_start);
        self.header.flags = flags;
        Ok(())
    }
}

/// Reads until `buf` is full or the stream ends. Returns the bytes read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
