//! Fuzz target for the scan-and-mark pass used by delete and replace.
//!
//! Marking every entry must never turn a listable archive into one that
//! fails to list.
//!
//! Run with: cargo +nightly fuzz run tombstone_scan

#![no_main]

use libfuzzer_sys::fuzz_target;
use smpa::context::ArchiveContext;
use smpa::format::FILE_SIGNATURE;
use smpa::progress::Progress;
use smpa::{ArchiveReader, OpenMode, SessionOptions};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut bytes = FILE_SIGNATURE.to_vec();
    bytes.extend_from_slice(data);

    let listable = ArchiveReader::from_reader(
        Cursor::new(bytes.clone()),
        OpenMode::List,
        SessionOptions::new(),
    )
    .and_then(|mut r| r.entries())
    .is_ok();

    let Ok(mut ctx) = ArchiveContext::open(Cursor::new(bytes), Progress::default()) else {
        return;
    };
    if ctx.validate_file_header().is_err() || ctx.scan_and_mark(|_, _| true).is_err() {
        return;
    }
    let marked = ctx.into_inner().into_inner();

    let entries = ArchiveReader::from_reader(Cursor::new(marked), OpenMode::List, SessionOptions::new())
        .and_then(|mut r| r.entries());
    if listable {
        assert!(matches!(entries.as_deref(), Ok([])));
    }
});
