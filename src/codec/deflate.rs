//! Streaming deflate pump.
//!
//! Drives a [`flate2::Compress`] or [`flate2::Decompress`] one step at a time:
//! refill the input buffer when it is drained, run one codec step into the
//! output buffer, write whatever was produced, then poll progress. An
//! iteration that neither refills input nor yields output means the stream
//! can never finish and is reported as corruption.

use std::io::{Read, Write};

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use super::StreamStats;
use crate::context::read_full;
use crate::format::BUFFER_SIZE;
use crate::progress::Progress;
use crate::{Error, Result};

/// Maps a compressor failure. flate2 reports only stream-state errors here;
/// allocation failure aborts the process instead of surfacing as an error.
fn compress_error(e: &flate2::CompressError, offset: u64) -> Error {
    Error::bad_archive(offset, format!("deflate stream error: {}", e))
}

/// Compresses `src` until it is exhausted, writing a zlib stream to `dst`.
///
/// `level` is the deflate level (0-9).
pub fn compress_stream<R, W>(
    src: &mut R,
    dst: &mut W,
    level: u32,
    progress: &mut Progress,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut codec = Compress::new(Compression::new(level.min(9)), true);
    let mut in_buf = vec![0u8; BUFFER_SIZE];
    let mut out_buf = vec![0u8; BUFFER_SIZE];
    let (mut in_pos, mut in_len) = (0usize, 0usize);
    let mut src_end = false;
    let mut stats = StreamStats::default();

    loop {
        let mut made_progress = false;

        if in_pos == in_len && !src_end {
            let n = read_full(src, &mut in_buf).map_err(Error::Read)?;
            if n < BUFFER_SIZE {
                src_end = true;
            }
            in_pos = 0;
            in_len = n;
            stats.bytes_read += n as u64;
            progress.add_bytes(n as u64);
            made_progress = true;
        }

        let flush = if src_end {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };
        let before_in = codec.total_in();
        let before_out = codec.total_out();
        let status = codec
            .compress(&in_buf[in_pos..in_len], &mut out_buf, flush)
            .map_err(|e| compress_error(&e, stats.bytes_written))?;
        let consumed = (codec.total_in() - before_in) as usize;
        let produced = (codec.total_out() - before_out) as usize;
        in_pos += consumed;

        if produced > 0 {
            dst.write_all(&out_buf[..produced]).map_err(Error::Write)?;
            stats.bytes_written += produced as u64;
            made_progress = true;
        }

        progress.tick()?;
        if status == Status::StreamEnd {
            return Ok(stats);
        }
        if !made_progress && consumed == 0 {
            return Err(Error::bad_archive(
                stats.bytes_written,
                "deflate stream stopped making progress",
            ));
        }
    }
}

/// Decompresses `pack_size` bytes of zlib stream from `src` into `dst`.
///
/// `offset` locates the content in the archive for error reporting.
///
/// # Errors
///
/// [`Error::BadArchive`] if the stream is malformed, ends early, or decodes
/// to anything other than exactly `unp_size` bytes.
pub fn decompress_stream<R, W>(
    src: &mut R,
    dst: &mut W,
    pack_size: u64,
    unp_size: u64,
    offset: u64,
    progress: &mut Progress,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut codec = Decompress::new(true);
    let mut in_buf = vec![0u8; BUFFER_SIZE];
    let mut out_buf = vec![0u8; BUFFER_SIZE];
    let (mut in_pos, mut in_len) = (0usize, 0usize);
    let mut remaining = pack_size;
    let mut stats = StreamStats::default();

    loop {
        let mut made_progress = false;

        if in_pos == in_len && remaining > 0 {
            let want = remaining.min(BUFFER_SIZE as u64) as usize;
            src.read_exact(&mut in_buf[..want]).map_err(Error::Read)?;
            in_pos = 0;
            in_len = want;
            remaining -= want as u64;
            stats.bytes_read += want as u64;
            progress.add_bytes(want as u64);
            made_progress = true;
        }

        let before_in = codec.total_in();
        let before_out = codec.total_out();
        let status = codec
            .decompress(&in_buf[in_pos..in_len], &mut out_buf, FlushDecompress::None)
            .map_err(|e| Error::bad_archive(offset, format!("invalid deflate stream: {}", e)))?;
        in_pos += (codec.total_in() - before_in) as usize;
        let produced = (codec.total_out() - before_out) as usize;

        if produced > 0 {
            stats.bytes_written += produced as u64;
            if stats.bytes_written > unp_size {
                return Err(Error::bad_archive(
                    offset,
                    format!("content decodes to more than {} bytes", unp_size),
                ));
            }
            dst.write_all(&out_buf[..produced]).map_err(Error::Write)?;
            made_progress = true;
        }

        progress.tick()?;
        if status == Status::StreamEnd {
            break;
        }
        if !made_progress {
            return Err(Error::bad_archive(offset, "compressed content ends prematurely"));
        }
    }

    if stats.bytes_written != unp_size {
        return Err(Error::bad_archive(
            offset,
            format!(
                "content decoded to {} bytes, expected {}",
                stats.bytes_written, unp_size
            ),
        ));
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::AtomicProgress;
    use rand::RngCore;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    fn quiet() -> Progress {
        Progress::new(None, Duration::ZERO)
    }

    #[test]
    fn test_compressor_error_is_corruption() {
        let mut codec = Compress::new(Compression::default(), true);
        let mut out = [0u8; 64];
        let status = codec.compress(b"", &mut out, FlushCompress::Finish).unwrap();
        assert_eq!(status, Status::StreamEnd);
        // A finished stream only accepts further Finish calls.
        let err = codec.compress(b"x", &mut out, FlushCompress::None).unwrap_err();
        let mapped = compress_error(&err, 12);
        assert!(mapped.is_corruption());
        assert!(matches!(mapped, Error::BadArchive { offset: 12, .. }));
    }

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let stats = compress_stream(&mut Cursor::new(data), &mut out, 6, &mut quiet()).unwrap();
        assert_eq!(stats.bytes_read, data.len() as u64);
        assert_eq!(stats.bytes_written, out.len() as u64);
        out
    }

    fn decompress(packed: &[u8], unp_size: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        decompress_stream(
            &mut Cursor::new(packed),
            &mut out,
            packed.len() as u64,
            unp_size,
            0,
            &mut quiet(),
        )?;
        Ok(out)
    }

    #[test]
    fn test_compressible_data_shrinks() {
        let data = vec![b'a'; 300_000];
        let packed = compress(&data);
        assert!(packed.len() < data.len() / 10);
        // zlib header
        assert_eq!(packed[0], 0x78);
        assert_eq!(decompress(&packed, data.len() as u64).unwrap(), data);
    }

    #[test]
    fn test_random_data_spanning_buffers() {
        let mut data = vec![0u8; BUFFER_SIZE * 3 + 17];
        rand::thread_rng().fill_bytes(&mut data);
        let packed = compress(&data);
        assert!(packed.len() > data.len());
        assert_eq!(decompress(&packed, data.len() as u64).unwrap(), data);
    }

    #[test]
    fn test_empty_input() {
        let packed = compress(b"");
        assert!(!packed.is_empty());
        assert_eq!(decompress(&packed, 0).unwrap(), b"");
    }

    #[test]
    fn test_size_mismatch_is_corruption() {
        let data = b"The quick brown fox jumps over the lazy dog".repeat(4);
        let packed = compress(&data);
        assert!(matches!(
            decompress(&packed, data.len() as u64 + 1),
            Err(Error::BadArchive { .. })
        ));
        assert!(matches!(
            decompress(&packed, data.len() as u64 - 1),
            Err(Error::BadArchive { .. })
        ));
    }

    #[test]
    fn test_truncated_stream_is_corruption() {
        let data = b"0123456789abcdef".repeat(1000);
        let packed = compress(&data);
        let cut = &packed[..packed.len() / 2];
        assert!(matches!(
            decompress(cut, data.len() as u64),
            Err(Error::BadArchive { .. })
        ));
    }

    #[test]
    fn test_garbage_is_corruption() {
        let garbage = [0xFFu8; 64];
        assert!(decompress(&garbage, 64).unwrap_err().is_corruption());
    }

    #[test]
    fn test_decompress_cancel() {
        let mut data = vec![0u8; BUFFER_SIZE * 4];
        rand::thread_rng().fill_bytes(&mut data);
        let packed = compress(&data);

        let sink = AtomicProgress::shared();
        sink.cancel();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::ZERO);
        let mut out = Vec::new();
        let err = decompress_stream(
            &mut Cursor::new(&packed),
            &mut out,
            packed.len() as u64,
            data.len() as u64,
            0,
            &mut progress,
        )
        .unwrap_err();
        assert!(err.is_cancelled());
        assert!(out.len() <= BUFFER_SIZE);
    }

    #[test]
    fn test_progress_counts_bytes() {
        let data = vec![7u8; 1000];
        let sink = AtomicProgress::shared();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::ZERO);
        let mut out = Vec::new();
        compress_stream(&mut Cursor::new(&data), &mut out, 9, &mut progress).unwrap();
        assert_eq!(sink.bytes(), 1000);
        assert!(sink.notifications() >= 1);
    }
}
