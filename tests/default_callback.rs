//! The process-wide fallback progress callback.
//!
//! Kept in its own test binary: the default can be installed only once per
//! process.

mod common;

use std::sync::atomic::{AtomicU64, Ordering};

use common::{Fixture, unthrottled};
use smpa::progress::has_default_callback;
use smpa::{ArchiveReader, OpenMode, ProgressAmount, SessionOptions, set_default_callback};

static DEFAULT_CALLS: AtomicU64 = AtomicU64::new(0);

#[test]
fn test_default_callback_resolution() {
    let fx = Fixture::new();
    fx.write_file("a.txt", b"a");
    fx.pack(&["a.txt"]);

    assert!(!has_default_callback());
    assert!(set_default_callback(|_, _| {
        DEFAULT_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }));
    assert!(has_default_callback());
    assert!(!set_default_callback(|_, _| false));

    // Without a session callback the default receives notifications.
    ArchiveReader::open_path_with(&fx.archive, OpenMode::List, SessionOptions::new())
        .unwrap()
        .entries()
        .unwrap();
    let after_default = DEFAULT_CALLS.load(Ordering::SeqCst);
    assert!(after_default > 0);

    // A session callback takes precedence.
    let mut session_calls = 0u64;
    let entries = {
        let (tx, rx) = std::sync::mpsc::channel();
        let entries = ArchiveReader::open_path_with(
            &fx.archive,
            OpenMode::List,
            unthrottled(move |_: Option<&str>, _: ProgressAmount| tx.send(()).is_ok()),
        )
        .unwrap()
        .entries()
        .unwrap();
        session_calls += rx.try_iter().count() as u64;
        entries
    };
    assert_eq!(entries.len(), 1);
    assert!(session_calls > 0);
    assert_eq!(DEFAULT_CALLS.load(Ordering::SeqCst), after_default);
}
