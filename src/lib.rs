//! # smpa
//!
//! Reading and writing SMPA single-file archives.
//!
//! An SMPA archive is a signature followed by a linear log of entries, each a
//! fixed header, a UTF-16 path and raw or deflate-compressed content. There is
//! no index: entries are found by scanning. Entries are only ever appended,
//! and deletion flips a flag bit in place, leaving a tombstone behind.
//!
//! ## Quick Start
//!
//! ### Listing and Extracting
//!
//! ```rust,no_run
//! use smpa::{ArchiveReader, OpenMode, Result};
//!
//! fn main() -> Result<()> {
//!     let mut reader = ArchiveReader::open_path("archive.smpa", OpenMode::Extract)?;
//!     while let Some(entry) = reader.next_entry()? {
//!         println!("{:>12} {} {}", entry.unp_size, entry.time, entry.path);
//!         if entry.is_directory() {
//!             reader.skip()?;
//!         } else {
//!             reader.extract_to(format!("out/{}", entry.name()))?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Packing
//!
//! ```rust,no_run
//! use smpa::{PackOptions, Result, SessionOptions, pack_files};
//!
//! fn main() -> Result<()> {
//!     let summary = pack_files(
//!         "archive.smpa",
//!         "docs",
//!         "/home/user",
//!         &["notes\\", "notes\\todo.txt"],
//!         &PackOptions::new().save_paths(true),
//!         SessionOptions::default(),
//!     )?;
//!     println!("{} bytes in, {} bytes stored", summary.bytes_read, summary.bytes_written);
//!     Ok(())
//! }
//! ```
//!
//! ### Deleting and Probing
//!
//! ```rust,no_run
//! use smpa::{SessionOptions, can_handle_file, delete_files};
//!
//! if can_handle_file("archive.smpa") {
//!     // Removes "docs" and everything below it.
//!     delete_files("archive.smpa", &["docs\\"], SessionOptions::default())?;
//! }
//! # Ok::<(), smpa::Error>(())
//! ```
//!
//! ## Cancellation
//!
//! Every operation polls a [`ProgressCallback`](progress::ProgressCallback)
//! while it works. Returning `false` aborts with [`Error::Cancelled`]; see the
//! [`progress`] module.
//!
//! ## Status Codes
//!
//! Hosts that speak integer status codes convert results with
//! [`status::status_of`] and [`status::status_of_next`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod context;
pub mod delete;
pub mod error;
pub mod format;
pub mod options;
pub mod paths;
pub mod probe;
pub mod progress;
pub mod read;
pub mod status;
pub mod write;

pub use delete::{DeleteSet, delete_files};
pub use error::{Error, ErrorKind, Result};
pub use format::{Attributes, DosDateTime, EntryFlags, EntryHeader};
pub use options::{OpenMode, PackFlags, PackOptions, ProcessOp, SessionOptions};
pub use probe::{can_handle_file, is_archive};
pub use progress::{
    AtomicProgress, NoProgress, ProgressAmount, ProgressCallback, set_default_callback,
};
pub use read::{ArchiveReader, EntryInfo};
pub use status::StatusCode;
pub use write::{PackSummary, pack_files};
