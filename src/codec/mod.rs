//! Content transfer between the archive and the filesystem.
//!
//! Entry content is either stored raw or as a zlib-wrapped deflate stream.
//! Both directions move data through a pair of fixed
//! [`BUFFER_SIZE`](crate::format::BUFFER_SIZE) buffers and poll the session's
//! [`Progress`](crate::progress::Progress) after every chunk, so a transfer can
//! be cancelled in the middle of a file.
//!
//! - [`deflate`]: the compressing and decompressing pump
//! - [`copy`]: the stored (uncompressed) path

pub mod copy;
pub mod deflate;

pub use copy::{copy_exact, copy_to_end};
pub use deflate::{compress_stream, decompress_stream};

/// Byte counts of one content transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes consumed from the source.
    pub bytes_read: u64,
    /// Bytes produced into the destination.
    pub bytes_written: u64,
}
