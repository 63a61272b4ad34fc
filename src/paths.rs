//! String helpers for archive paths.
//!
//! Archive paths are stored with `\` between components. Input from callers
//! may use either `\` or `/`, and every helper here treats both as
//! separators. Comparisons between archive paths are case-insensitive.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::format::PATH_SEPARATOR;

/// Returns whether `c` separates path components.
#[inline]
pub fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Joins two archive path fragments with a single `\`.
///
/// No separator is inserted if either side is empty or `path` already ends
/// with one.
pub fn combine(path: &str, name: &str) -> String {
    let mut result = String::with_capacity(path.len() + name.len() + 1);
    result.push_str(path);
    if !path.is_empty() && !name.is_empty() && !path.ends_with(is_separator) {
        result.push(PATH_SEPARATOR);
    }
    result.push_str(name);
    result
}

/// Resolves a relative path with either separator style against a
/// filesystem base directory.
#[cfg(not(windows))]
pub fn combine_native(base: &Path, relative: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    if out.as_os_str().is_empty() && relative.starts_with(is_separator) {
        out.push(std::path::MAIN_SEPARATOR_STR);
    }
    for part in relative.split(is_separator).filter(|p| !p.is_empty()) {
        out.push(part);
    }
    out
}

/// Resolves a relative path with either separator style against a
/// filesystem base directory.
#[cfg(windows)]
pub fn combine_native(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// Converts every `/` to the archive separator.
pub fn to_archive_separators(path: &str) -> String {
    path.replace('/', "\\")
}

/// Returns the last component of `path`.
pub fn file_name(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Removes one trailing separator, if present.
pub fn strip_trailing_separator(path: &str) -> &str {
    path.strip_suffix(is_separator).unwrap_or(path)
}

/// Returns the parent of `path`, or an empty string at the top level.
pub fn up_dir(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Upper-cases `path` for case-insensitive comparison.
pub fn fold_case(path: &str) -> String {
    path.chars().flat_map(char::to_uppercase).collect()
}

/// Compares two paths ignoring case.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase))
}

/// Drops paths whose file name repeats a later path's file name.
///
/// File names are compared case-insensitively, and of each group of
/// duplicates only the last one in input order survives. The relative order
/// of surviving paths is preserved.
pub fn remove_file_name_duplicates(paths: Vec<String>) -> Vec<String> {
    let mut last_index: HashMap<String, usize> = HashMap::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        last_index.insert(fold_case(file_name(path)), index);
    }
    paths
        .into_iter()
        .enumerate()
        .filter(|(index, path)| last_index.get(&fold_case(file_name(path))) == Some(index))
        .map(|(_, path)| path)
        .collect()
}

/// Returns whether an archive path stays inside the directory it is
/// extracted to.
///
/// Rejects empty paths, absolute paths, drive prefixes and `.`/`..`
/// components.
pub fn is_safe_relative(path: &str) -> bool {
    if path.is_empty() || path.contains('\0') || path.starts_with(is_separator) {
        return false;
    }
    path.split(is_separator)
        .all(|part| part != "." && part != ".." && !part.contains(':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_combine() {
        assert_eq!(combine("", "a.txt"), "a.txt");
        assert_eq!(combine("dir", ""), "dir");
        assert_eq!(combine("dir", "a.txt"), "dir\\a.txt");
        assert_eq!(combine("dir\\", "a.txt"), "dir\\a.txt");
        assert_eq!(combine("dir/", "a.txt"), "dir/a.txt");
    }

    #[test]
    fn test_combine_native() {
        let base = Path::new("root");
        assert_eq!(
            combine_native(base, "a\\b/c.txt"),
            base.join("a").join("b").join("c.txt")
        );
        assert_eq!(combine_native(base, ""), base.to_path_buf());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("a\\b\\c.txt"), "c.txt");
        assert_eq!(file_name("a/b/c.txt"), "c.txt");
        assert_eq!(file_name("c.txt"), "c.txt");
        assert_eq!(file_name("dir\\"), "");
    }

    #[test]
    fn test_strip_trailing_separator() {
        assert_eq!(strip_trailing_separator("dir\\"), "dir");
        assert_eq!(strip_trailing_separator("dir/"), "dir");
        assert_eq!(strip_trailing_separator("dir"), "dir");
        assert_eq!(strip_trailing_separator("dir\\\\"), "dir\\");
        assert_eq!(strip_trailing_separator(""), "");
    }

    #[test]
    fn test_up_dir() {
        assert_eq!(up_dir("D\\sub\\x"), "D\\sub");
        assert_eq!(up_dir("D\\sub"), "D");
        assert_eq!(up_dir("D"), "");
        assert_eq!(up_dir("a/b"), "a");
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(fold_case("Dir\\Żółw.txt"), "DIR\\ŻÓŁW.TXT");
        assert_eq!(cmp_ignore_case("README.md", "readme.MD"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("a", "B"), Ordering::Less);
        assert_eq!(cmp_ignore_case("b", "A"), Ordering::Greater);
    }

    #[test]
    fn test_remove_duplicates_keeps_last() {
        let paths = vec![
            "A\\f.txt".to_string(),
            "g.txt".to_string(),
            "B\\F.TXT".to_string(),
        ];
        assert_eq!(
            remove_file_name_duplicates(paths),
            vec!["g.txt".to_string(), "B\\F.TXT".to_string()]
        );
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative("a\\b.txt"));
        assert!(is_safe_relative("a/b..c"));
        assert!(!is_safe_relative(""));
        assert!(!is_safe_relative("\\etc\\passwd"));
        assert!(!is_safe_relative("a\\..\\..\\x"));
        assert!(!is_safe_relative("C:\\x"));
        assert!(!is_safe_relative("./x"));
    }

    proptest! {
        #[test]
        fn prop_up_dir_shrinks(path in "[a-zA-Z\\\\/]{0,40}") {
            let parent = up_dir(&path);
            prop_assert!(parent.len() < path.len() || path.is_empty());
            prop_assert!(path.starts_with(parent));
        }

        #[test]
        fn prop_combine_then_split(dir in "[a-z]{1,8}", name in "[a-z]{1,8}") {
            let joined = combine(&dir, &name);
            prop_assert_eq!(file_name(&joined), name.as_str());
            prop_assert_eq!(up_dir(&joined), dir.as_str());
        }

        #[test]
        fn prop_dedup_unique_names(paths in proptest::collection::vec("[a-cA-C]{1,2}(\\\\[a-cA-C]{1,2})?", 0..20)) {
            let kept = remove_file_name_duplicates(paths.clone());
            let mut names: Vec<String> = kept.iter().map(|p| fold_case(file_name(p))).collect();
            let count = names.len();
            names.sort();
            names.dedup();
            prop_assert_eq!(names.len(), count);
            for path in &kept {
                prop_assert!(paths.contains(path));
            }
        }
    }
}
