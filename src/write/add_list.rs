//! Turning a host add-list into the ordered set of entries to pack.

use crate::paths;

/// One source path and the archive path it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    /// Path relative to the source root, as given by the caller.
    pub relative: String,
    /// Path inside the archive.
    pub archive_path: String,
}

/// Builds the pack plan from raw add-list items.
///
/// Items ending in a separator denote directories. They are kept only when
/// `save_paths` is set; otherwise only files are packed, flattened to their
/// file names, and of several files sharing a name only the last one wins.
/// The result is sorted case-insensitively by archive path, so a directory
/// always precedes its contents.
pub fn plan<S: AsRef<str>>(items: &[S], sub_path: &str, save_paths: bool) -> Vec<PackItem> {
    let mut relative: Vec<String> = items
        .iter()
        .map(|item| item.as_ref())
        .filter(|item| save_paths || !item.ends_with(paths::is_separator))
        .map(paths::strip_trailing_separator)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if !save_paths {
        relative = paths::remove_file_name_duplicates(relative);
    }

    let mut items: Vec<PackItem> = relative
        .into_iter()
        .map(|rel| {
            let name = if save_paths {
                rel.as_str()
            } else {
                paths::file_name(&rel)
            };
            let archive_path = paths::to_archive_separators(paths::strip_trailing_separator(
                &paths::combine(sub_path, name),
            ));
            PackItem {
                relative: rel,
                archive_path,
            }
        })
        .collect();
    items.sort_by(|a, b| paths::cmp_ignore_case(&a.archive_path, &b.archive_path));
    items
}

/// Case-folded, sorted archive paths for replacement lookups.
#[derive(Debug, Default)]
pub struct ReplaceSet(Vec<String>);

impl ReplaceSet {
    /// Builds the lookup set from a pack plan.
    pub fn new(items: &[PackItem]) -> Self {
        let mut folded: Vec<String> = items
            .iter()
            .map(|item| paths::fold_case(&item.archive_path))
            .collect();
        folded.sort();
        folded.dedup();
        Self(folded)
    }

    /// Returns whether an existing entry path is about to be replaced.
    pub fn contains(&self, path: &str) -> bool {
        self.0
            .binary_search(&paths::fold_case(&paths::to_archive_separators(path)))
            .is_ok()
    }
}
