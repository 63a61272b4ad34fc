//! Tombstone deletion through the public API.

mod common;

use common::{Fixture, raw_headers};
use smpa::{Error, SessionOptions, delete_files};

/// Archive order is case-folded code-point order, so `Dx.txt` sorts before
/// `D\child.txt`.
fn populated() -> Fixture {
    let fx = Fixture::new();
    fx.write_file("D/child.txt", b"child content");
    fx.write_file("D/sub/x", b"x content in a sub directory");
    fx.write_file("Dx.txt", b"sibling with a shared prefix");
    fx.write_file("keep.txt", b"keep me");
    fx.pack(&[
        "D\\",
        "D\\child.txt",
        "D\\sub\\",
        "D\\sub\\x",
        "Dx.txt",
        "keep.txt",
    ]);
    fx
}

#[test]
fn test_deleted_entry_is_not_listed_and_archive_keeps_size() {
    let fx = populated();
    let before = fx.archive_len();

    let marked = delete_files(&fx.archive, &["keep.txt"], SessionOptions::new()).unwrap();
    assert_eq!(marked, 1);
    assert!(!fx.names().contains(&"keep.txt".to_string()));
    assert_eq!(fx.archive_len(), before);

    // Deleting again finds nothing live.
    let marked = delete_files(&fx.archive, &["keep.txt"], SessionOptions::new()).unwrap();
    assert_eq!(marked, 0);
    assert_eq!(fx.archive_len(), before);
}

#[test]
fn test_delete_is_case_insensitive_and_accepts_slashes() {
    let fx = populated();
    let marked = delete_files(&fx.archive, &["d/CHILD.TXT"], SessionOptions::new()).unwrap();
    assert_eq!(marked, 1);
    assert!(!fx.names().contains(&"D\\child.txt".to_string()));
}

#[test]
fn test_directory_delete_cascades() {
    let fx = populated();
    let marked = delete_files(&fx.archive, &["D"], SessionOptions::new()).unwrap();
    assert_eq!(marked, 4);
    assert_eq!(fx.names(), ["Dx.txt", "keep.txt"]);
}

#[test]
fn test_wildcard_and_trailing_separator_select_directory() {
    let fx = populated();
    delete_files(&fx.archive, &["D\\sub\\*.*"], SessionOptions::new()).unwrap();
    assert_eq!(fx.names(), ["D", "Dx.txt", "D\\child.txt", "keep.txt"]);

    delete_files(&fx.archive, &["D/"], SessionOptions::new()).unwrap();
    assert_eq!(fx.names(), ["Dx.txt", "keep.txt"]);
}

#[test]
fn test_re_adding_appends_new_entry() {
    let fx = populated();
    delete_files(&fx.archive, &["keep.txt"], SessionOptions::new()).unwrap();
    let after_delete = fx.archive_len();

    fx.write_file("keep.txt", b"back again");
    let summary = fx.pack(&["keep.txt"]);
    assert_eq!(summary.replaced, 0);
    assert!(fx.archive_len() > after_delete);

    let headers = raw_headers(&fx.archive_bytes());
    let keeps: Vec<_> = headers
        .iter()
        .filter(|(_, _, path)| path == "keep.txt")
        .collect();
    assert_eq!(keeps.len(), 2);
    assert!(keeps[0].1.flags.is_deleted());
    assert!(!keeps[1].1.flags.is_deleted());
    assert!(keeps[1].0 > keeps[0].0);

    assert_eq!(fx.names().iter().filter(|n| *n == "keep.txt").count(), 1);
}

#[test]
fn test_tombstone_only_flips_flag_bit() {
    let fx = populated();
    let before = fx.archive_bytes();
    delete_files(&fx.archive, &["Dx.txt"], SessionOptions::new()).unwrap();
    let after = fx.archive_bytes();

    let diffs: Vec<usize> = before
        .iter()
        .zip(&after)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(diffs.len(), 1);
    let offset = diffs[0];
    assert_eq!(after[offset], before[offset] | smpa::EntryFlags::DELETED.bits());

    let (entry_offset, _, path) = raw_headers(&after)
        .into_iter()
        .find(|(_, header, _)| header.flags.is_deleted())
        .unwrap();
    assert_eq!(path, "Dx.txt");
    assert_eq!(offset as u64, entry_offset + smpa::format::FLAGS_OFFSET);
}

#[test]
fn test_empty_delete_list_is_noop() {
    let fx = Fixture::new();
    let empty: [&str; 0] = [];
    // The archive does not even exist: it is never opened.
    assert_eq!(delete_files(&fx.archive, &empty, SessionOptions::new()).unwrap(), 0);
    assert!(!fx.archive.exists());
}

#[test]
fn test_missing_archive_is_create_error() {
    let fx = Fixture::new();
    let err = delete_files(&fx.archive, &["a"], SessionOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Create { .. }));
}

#[test]
fn test_foreign_file_is_bad_archive() {
    let fx = Fixture::new();
    std::fs::write(&fx.archive, b"definitely not an archive").unwrap();
    let err = delete_files(&fx.archive, &["a"], SessionOptions::new()).unwrap_err();
    assert!(err.is_corruption());
}
