//! Fuzz target for listing arbitrary bytes as an archive.
//!
//! The signature is prepended so that the fuzzer spends its time in the
//! entry parser rather than on the first eight bytes.
//!
//! Run with: cargo +nightly fuzz run archive_list

#![no_main]

use libfuzzer_sys::fuzz_target;
use smpa::format::FILE_SIGNATURE;
use smpa::{ArchiveReader, OpenMode, SessionOptions};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut bytes = FILE_SIGNATURE.to_vec();
    bytes.extend_from_slice(data);

    // We don't care about the result - we're looking for panics or hangs
    if let Ok(mut reader) =
        ArchiveReader::from_reader(Cursor::new(bytes), OpenMode::List, SessionOptions::new())
    {
        while let Ok(Some(entry)) = reader.next_entry() {
            let _ = entry.name();
            let _ = entry.modified();
            if reader.skip().is_err() {
                break;
            }
        }
    }
});
