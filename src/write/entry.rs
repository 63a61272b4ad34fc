//! Appending a single filesystem object as an archive entry.

use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use crate::codec::{StreamStats, compress_stream, copy_to_end};
use crate::format::{
    Attributes, DosDateTime, EntryFlags, EntryHeader, PACK_SIZE_OFFSET, encode_path,
    should_compress,
};
use crate::progress::Progress;
use crate::{Error, Result};

/// What was written for one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedEntry {
    /// Whether the source was a directory.
    pub is_directory: bool,
    /// Bytes read from the source.
    pub unp_size: u64,
    /// Content bytes written to the archive.
    pub pack_size: u64,
}

/// Builds the header for a source path from its metadata.
///
/// `pack_size` is provisional and equals the source size.
pub(crate) fn header_for(source: &Path, archive_path_len: u16) -> Result<EntryHeader> {
    let metadata = fs::metadata(source).map_err(|e| Error::Read(with_path(source, e)))?;
    let is_directory = metadata.is_dir();
    let unp_size = if is_directory { 0 } else { metadata.len() };

    let mut attributes = Attributes::from_metadata(source, &metadata);
    if is_directory {
        attributes.insert(Attributes::DIRECTORY);
    }
    let modified = metadata
        .modified()
        .map_err(|e| Error::UnknownFormat(format!("{}: {}", source.display(), e)))?;

    let mut flags = EntryFlags::default();
    if !is_directory && should_compress(unp_size) {
        flags.insert(EntryFlags::COMPRESSED);
    }

    Ok(EntryHeader {
        flags,
        attributes,
        time: DosDateTime::from_system_time(modified)?,
        pack_size: unp_size,
        unp_size,
        path_len: archive_path_len,
    })
}

/// Writes the entry for `source` at the current position of `archive`.
///
/// The header is written before the content. When compression changes the
/// content length, only the `pack_size` field is patched afterwards and the
/// cursor is returned to the end of the entry.
pub(crate) fn pack_entry<W: Write + Seek>(
    archive: &mut W,
    progress: &mut Progress,
    source: &Path,
    archive_path: &str,
    level: u32,
) -> Result<PackedEntry> {
    let path_bytes = encode_path(archive_path)?;
    let header = header_for(source, (path_bytes.len() / 2) as u16)?;

    let entry_start = archive.stream_position().map_err(Error::Seek)?;
    archive.write_all(&header.encode()).map_err(Error::Write)?;
    archive.write_all(&path_bytes).map_err(Error::Write)?;

    if header.is_directory() {
        log::debug!("Packed directory '{}'", archive_path);
        return Ok(PackedEntry {
            is_directory: true,
            ..PackedEntry::default()
        });
    }

    let mut src = File::open(source).map_err(|e| Error::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    let compressed = header.flags.is_compressed();
    let stats: StreamStats = if compressed {
        compress_stream(&mut src, archive, level, progress)?
    } else {
        copy_to_end(&mut src, archive, progress)?
    };

    if stats.bytes_read != header.unp_size {
        return Err(Error::Read(with_path(
            source,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read {} bytes, expected {}",
                    stats.bytes_read, header.unp_size
                ),
            ),
        )));
    }
    if compressed && stats.bytes_written != stats.bytes_read {
        patch_pack_size(archive, entry_start, stats.bytes_written)?;
    }

    log::debug!(
        "Packed '{}' ({} -> {} bytes)",
        archive_path,
        stats.bytes_read,
        stats.bytes_written
    );
    Ok(PackedEntry {
        is_directory: false,
        unp_size: stats.bytes_read,
        pack_size: stats.bytes_written,
    })
}

/// Rewrites the `pack_size` field of the entry starting at `entry_start`.
///
/// The cursor is restored to where it was, so the end of data never moves.
pub(crate) fn patch_pack_size<W: Write + Seek>(
    archive: &mut W,
    entry_start: u64,
    pack_size: u64,
) -> Result<()> {
    let end = archive.stream_position().map_err(Error::Seek)?;
    archive
        .seek(SeekFrom::Start(entry_start + PACK_SIZE_OFFSET))
        .map_err(Error::Seek)?;
    archive
        .write_all(&pack_size.to_le_bytes())
        .map_err(Error::Write)?;
    archive.seek(SeekFrom::Start(end)).map_err(Error::Seek)?;
    Ok(())
}

fn with_path(path: &Path, e: io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
}
