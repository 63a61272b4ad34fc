//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use smpa::format::{
    ENTRY_HEADER_SIZE, EntryHeader, FILE_SIGNATURE, FILE_SIGNATURE_SIZE, encode_path,
};
use smpa::{ArchiveReader, EntryInfo, OpenMode, PackOptions, PackSummary, SessionOptions};
use tempfile::TempDir;

/// A temporary source tree plus an archive path next to it.
pub struct Fixture {
    pub dir: TempDir,
    pub src: PathBuf,
    pub archive: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let src = dir.path().join("src");
        std::fs::create_dir(&src).expect("Failed to create source dir");
        let archive = dir.path().join("test.smpa");
        Self { dir, src, archive }
    }

    /// Writes a source file, creating parent directories.
    pub fn write_file(&self, relative: &str, data: &[u8]) -> PathBuf {
        let path = self.src.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, data).unwrap();
        path
    }

    /// Creates a source directory.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.src.join(relative);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    /// Packs `items` (relative to the source root) preserving paths.
    pub fn pack(&self, items: &[&str]) -> PackSummary {
        self.pack_with(items, "", &PackOptions::new().save_paths(true))
    }

    pub fn pack_with(&self, items: &[&str], sub_path: &str, options: &PackOptions) -> PackSummary {
        smpa::pack_files(&self.archive, sub_path, &self.src, items, options, quiet())
            .expect("Failed to pack")
    }

    /// Lists the live entries.
    pub fn list(&self) -> Vec<EntryInfo> {
        ArchiveReader::open_path(&self.archive, OpenMode::List)
            .and_then(|mut r| r.entries())
            .expect("Failed to list archive")
    }

    /// Lists the live entry paths in archive order.
    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|e| e.path).collect()
    }

    /// Extracts every entry below `out`, returning file contents by path.
    pub fn extract_all(&self, out: &Path) -> Vec<(String, Vec<u8>)> {
        std::fs::create_dir_all(out).unwrap();
        let mut reader = ArchiveReader::open_path(&self.archive, OpenMode::Extract).unwrap();
        let mut files = Vec::new();
        while let Some(entry) = reader.next_entry().unwrap() {
            let dest = smpa::paths::combine_native(out, &entry.path);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            if entry.is_directory() && dest.is_dir() {
                reader.skip().unwrap();
                continue;
            }
            reader.extract_to(&dest).unwrap();
            if !entry.is_directory() {
                files.push((entry.path.clone(), std::fs::read(&dest).unwrap()));
            }
        }
        files
    }

    pub fn archive_bytes(&self) -> Vec<u8> {
        std::fs::read(&self.archive).unwrap()
    }

    pub fn archive_len(&self) -> u64 {
        std::fs::metadata(&self.archive).unwrap().len()
    }
}

/// Session options that never reach a progress callback.
pub fn quiet() -> SessionOptions {
    SessionOptions::new()
}

/// Session options delivering every notification to `callback`.
pub fn unthrottled(callback: impl smpa::ProgressCallback + 'static) -> SessionOptions {
    SessionOptions::new()
        .progress_interval(Duration::ZERO)
        .callback(callback)
}

/// Deterministic incompressible bytes.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

/// Highly compressible bytes.
pub fn compressible_bytes(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// A raw entry as laid out on disk.
pub struct RawEntry {
    pub header: EntryHeader,
    pub path: String,
    pub content: Vec<u8>,
}

impl RawEntry {
    pub fn stored(path: &str, attributes: smpa::Attributes, content: &[u8]) -> Self {
        let path_len = (encode_path(path).unwrap().len() / 2) as u16;
        Self {
            header: EntryHeader {
                flags: smpa::EntryFlags::default(),
                attributes,
                time: smpa::DosDateTime::from_raw(0x5A21_6C3D),
                pack_size: content.len() as u64,
                unp_size: content.len() as u64,
                path_len,
            },
            path: path.to_string(),
            content: content.to_vec(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.header.encode().to_vec();
        out.extend_from_slice(&encode_path(&self.path).unwrap());
        out.extend_from_slice(&self.content);
        out
    }
}

/// Assembles an archive image from raw entries.
pub fn build_archive(entries: &[RawEntry]) -> Vec<u8> {
    let mut bytes = FILE_SIGNATURE.to_vec();
    for entry in entries {
        bytes.extend_from_slice(&entry.to_bytes());
    }
    bytes
}

/// Walks every header in an archive image, tombstones included.
///
/// Returns `(offset, header, path)` triples.
pub fn raw_headers(bytes: &[u8]) -> Vec<(u64, EntryHeader, String)> {
    let mut headers = Vec::new();
    let mut offset = FILE_SIGNATURE_SIZE as usize;
    while offset < bytes.len() {
        let buf: &[u8; ENTRY_HEADER_SIZE] = bytes[offset..offset + ENTRY_HEADER_SIZE]
            .try_into()
            .unwrap();
        let header = EntryHeader::decode(buf, offset as u64).unwrap();
        let path_start = offset + ENTRY_HEADER_SIZE;
        let path_end = path_start + usize::from(header.path_len) * 2;
        let path = smpa::format::decode_path(&bytes[path_start..path_end], offset as u64).unwrap();
        headers.push((offset as u64, header, path));
        offset = path_end + header.pack_size as usize;
    }
    assert_eq!(offset, bytes.len(), "entries must tile the archive exactly");
    headers
}
