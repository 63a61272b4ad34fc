//! Stored content: chunked byte-for-byte copies.

use std::io::{Read, Write};

use super::StreamStats;
use crate::context::read_full;
use crate::format::BUFFER_SIZE;
use crate::progress::Progress;
use crate::{Error, Result};

/// Copies exactly `size` bytes from `src` to `dst`.
///
/// Used when extracting stored entries. A short read is a read failure.
pub fn copy_exact<R, W>(
    src: &mut R,
    dst: &mut W,
    size: u64,
    progress: &mut Progress,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; size.min(BUFFER_SIZE as u64) as usize];
    let mut remaining = size;
    while remaining > 0 {
        let chunk = remaining.min(BUFFER_SIZE as u64) as usize;
        src.read_exact(&mut buf[..chunk]).map_err(Error::Read)?;
        dst.write_all(&buf[..chunk]).map_err(Error::Write)?;
        remaining -= chunk as u64;
        progress.add_bytes(chunk as u64);
        progress.tick()?;
    }
    Ok(StreamStats {
        bytes_read: size,
        bytes_written: size,
    })
}

/// Copies `src` to `dst` until `src` is exhausted.
///
/// Used when packing content too small to compress. The caller compares the
/// returned count against the size it expected.
pub fn copy_to_end<R, W>(src: &mut R, dst: &mut W, progress: &mut Progress) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = read_full(src, &mut buf).map_err(Error::Read)?;
        if n > 0 {
            dst.write_all(&buf[..n]).map_err(Error::Write)?;
            total += n as u64;
            progress.add_bytes(n as u64);
            progress.tick()?;
        }
        if n < BUFFER_SIZE {
            return Ok(StreamStats {
                bytes_read: total,
                bytes_written: total,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn test_copy_exact_leaves_trailing_bytes() {
        let mut src = Cursor::new(b"hello world".to_vec());
        let mut dst = Vec::new();
        let mut progress = Progress::new(None, Duration::ZERO);
        let stats = copy_exact(&mut src, &mut dst, 5, &mut progress).unwrap();
        assert_eq!(stats.bytes_written, 5);
        assert_eq!(dst, b"hello");
        assert_eq!(src.position(), 5);
    }

    #[test]
    fn test_copy_exact_short_source() {
        let mut src = Cursor::new(b"abc".to_vec());
        let mut dst = Vec::new();
        let mut progress = Progress::new(None, Duration::ZERO);
        let err = copy_exact(&mut src, &mut dst, 10, &mut progress).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }

    #[test]
    fn test_copy_zero() {
        let mut src = Cursor::new(Vec::new());
        let mut dst = Vec::new();
        let mut progress = Progress::new(None, Duration::ZERO);
        copy_exact(&mut src, &mut dst, 0, &mut progress).unwrap();
        let stats = copy_to_end(&mut src, &mut dst, &mut progress).unwrap();
        assert_eq!(stats, StreamStats::default());
        assert!(dst.is_empty());
    }

    #[test]
    fn test_copy_to_end_multiple_chunks() {
        let data: Vec<u8> = (0..BUFFER_SIZE * 2 + 3).map(|i| i as u8).collect();
        let mut dst = Vec::new();
        let mut progress = Progress::new(None, Duration::ZERO);
        let stats = copy_to_end(&mut Cursor::new(&data), &mut dst, &mut progress).unwrap();
        assert_eq!(stats.bytes_read, data.len() as u64);
        assert_eq!(dst, data);
    }
}
