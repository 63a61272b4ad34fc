//! Materializing the current entry on the filesystem.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::metadata::apply_metadata;
use crate::codec::{copy_exact, decompress_stream};
use crate::context::ArchiveContext;
use crate::{Error, Result};

/// Extracts the entry whose header was just read to `dest`.
///
/// The cursor must be at the start of the entry's content and is left at its
/// end. A cancelled extraction removes the directory or partial file it
/// created.
pub(crate) fn extract_current<R: Read + Seek>(
    ctx: &mut ArchiveContext<R>,
    dest: &Path,
) -> Result<()> {
    let dest = normalize_destination(dest)?;
    let header = *ctx.header();
    let content_start = ctx.content_start();

    if header.is_directory() {
        fs::create_dir(&dest).map_err(|source| Error::Create {
            path: dest.clone(),
            source,
        })?;
        if let Err(e) = ctx.progress().tick() {
            if let Err(rm) = fs::remove_dir(&dest) {
                log::warn!("Failed to remove '{}': {}", dest.display(), rm);
            }
            return Err(e);
        }
    } else {
        let mut file = File::create(&dest).map_err(|source| Error::Create {
            path: dest.clone(),
            source,
        })?;
        let result = write_content(ctx, &mut file, content_start);
        drop(file);
        if let Err(e) = result {
            if e.is_cancelled() {
                if let Err(rm) = fs::remove_file(&dest) {
                    log::warn!("Failed to remove partial '{}': {}", dest.display(), rm);
                }
            }
            return Err(e);
        }
    }

    log::debug!("Extracted '{}' to '{}'", ctx.path(), dest.display());
    apply_metadata(&dest, header.attributes, header.time);
    ctx.progress().tick()
}

fn write_content<R: Read + Seek>(
    ctx: &mut ArchiveContext<R>,
    file: &mut File,
    content_start: u64,
) -> Result<()> {
    ctx.progress().tick()?;
    let header = *ctx.header();
    let entry_start = ctx.entry_start();
    let (src, progress) = ctx.parts_mut();
    if header.flags.is_compressed() {
        decompress_stream(
            src,
            file,
            header.pack_size,
            header.unp_size,
            entry_start,
            progress,
        )?;
        // Bytes after the end of the deflate stream are ignored.
        src.seek(SeekFrom::Start(content_start + header.pack_size))
            .map_err(Error::Seek)?;
    } else {
        copy_exact(src, file, header.pack_size, progress)?;
    }
    Ok(())
}

fn normalize_destination(dest: &Path) -> Result<PathBuf> {
    let normalized: PathBuf = dest.components().collect();
    if normalized.as_os_str().is_empty() {
        return Err(Error::Write(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty destination path",
        )));
    }
    Ok(normalized)
}
