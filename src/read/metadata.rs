//! Metadata restoration for extracted files.

use std::path::Path;

use filetime::FileTime;

use crate::format::{Attributes, DosDateTime};

/// Applies the stored timestamp and attributes to an extracted path.
///
/// Best effort: failures are logged and otherwise ignored. The timestamp is
/// set first because a read-only file may refuse further changes.
pub(crate) fn apply_metadata(path: &Path, attributes: Attributes, time: DosDateTime) {
    match time.to_system_time() {
        Some(modified) => {
            let ft = FileTime::from_system_time(modified);
            if let Err(e) = filetime::set_file_times(path, ft, ft) {
                log::warn!(
                    "Failed to set modification time on '{}': {}",
                    path.display(),
                    e
                );
            }
        }
        None => log::warn!(
            "Entry time {:#010x} of '{}' is not a valid date",
            time.to_raw(),
            path.display()
        ),
    }

    attributes.apply(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_apply_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"x").unwrap();

        let naive = NaiveDate::from_ymd_opt(2001, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap();
        let time = DosDateTime::from_naive(naive).unwrap();
        apply_metadata(&path, Attributes::ARCHIVE, time);

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(DosDateTime::from_system_time(modified).unwrap(), time);
    }

    #[test]
    fn test_invalid_time_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"x").unwrap();
        apply_metadata(&path, Attributes::default(), DosDateTime::from_raw(0));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_path_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        apply_metadata(
            &dir.path().join("missing"),
            Attributes::READ_ONLY,
            DosDateTime::from_raw(0x5A21_6C3D),
        );
    }
}
