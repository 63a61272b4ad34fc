//! Command implementations for the CLI tool.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use smpa::{
    ArchiveReader, OpenMode, PackOptions, SessionOptions, can_handle_file, delete_files,
    pack_files, paths,
};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::file_selector::FileSelector;
use crate::output::{ExtractStats, create_formatter};
use crate::progress::CliProgress;

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub archive_path: &'a Path,
    pub output_dir: &'a Path,
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Configuration for the add command.
pub struct AddConfig<'a> {
    pub archive_path: &'a Path,
    pub src_root: &'a Path,
    pub files: &'a [PathBuf],
    pub sub_path: &'a str,
    pub flatten: bool,
    pub move_files: bool,
    pub level: u32,
    pub format: OutputFormat,
    pub quiet: bool,
}

fn report_error(error: &smpa::Error, progress: Option<&CliProgress>) -> ExitCode {
    if let Some(progress) = progress {
        progress.abandon("failed");
    }
    if error.is_cancelled() {
        eprintln!("Interrupted");
    } else {
        eprintln!("Error: {}", error);
    }
    error_to_exit_code(error)
}

/// List command implementation
pub fn list(archive_path: &Path, technical: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let entries = match ArchiveReader::open_path(archive_path, OpenMode::List)
        .and_then(|mut reader| reader.entries())
    {
        Ok(entries) => entries,
        Err(e) => return report_error(&e, None),
    };
    println!("{}", formatter.format_list(&entries, technical));
    ExitCode::Success
}

/// Extract command implementation
pub fn extract(config: &ExtractConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let selector = match FileSelector::new(config.include, config.exclude) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    if let Err(e) = std::fs::create_dir_all(config.output_dir) {
        eprintln!("Error creating output directory: {}", e);
        return ExitCode::IoError;
    }

    let total = std::fs::metadata(config.archive_path)
        .map(|m| m.len())
        .unwrap_or(0);
    let progress = CliProgress::bytes(total, config.quiet);
    let session = SessionOptions::new().callback(progress.clone());

    let mut stats = ExtractStats::default();
    let result = (|| -> smpa::Result<()> {
        let mut reader =
            ArchiveReader::open_path_with(config.archive_path, OpenMode::Extract, session)?;
        while let Some(entry) = reader.next_entry()? {
            if !selector.select(&entry) {
                stats.skipped += 1;
                continue;
            }
            if !paths::is_safe_relative(&entry.path) {
                log::warn!("Refusing to extract unsafe path '{}'", entry.path);
                stats.unsafe_paths.push(entry.path.clone());
                continue;
            }

            let dest = paths::combine_native(config.output_dir, &entry.path);
            if entry.is_directory() {
                if dest.is_dir() {
                    stats.directories += 1;
                    continue;
                }
                if let Some(parent) = dest.parent() {
                    create_parent(parent)?;
                }
                reader.extract_to(&dest)?;
                stats.directories += 1;
            } else {
                if let Some(parent) = dest.parent() {
                    create_parent(parent)?;
                }
                reader.extract_to(&dest)?;
                stats.files += 1;
                stats.bytes += entry.unp_size;
            }
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            progress.finish();
            println!("{}", formatter.format_extract_result(&stats));
            if stats.unsafe_paths.is_empty() {
                ExitCode::Success
            } else {
                ExitCode::Warning
            }
        }
        Err(e) => report_error(&e, Some(&progress)),
    }
}

fn create_parent(parent: &Path) -> smpa::Result<()> {
    std::fs::create_dir_all(parent).map_err(|source| smpa::Error::Create {
        path: parent.to_path_buf(),
        source,
    })
}

/// Converts a relative native path to archive form.
fn archive_relative(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("\\"))
}

/// Expands the command-line inputs into an add-list relative to `src_root`.
///
/// Directories are walked recursively and listed with a trailing `\`.
fn collect_add_list(src_root: &Path, inputs: &[PathBuf]) -> Result<Vec<String>, String> {
    let mut list = Vec::new();
    for input in inputs {
        let full = if input.is_absolute() {
            input.clone()
        } else {
            src_root.join(input)
        };
        let relative = full
            .strip_prefix(src_root)
            .ok()
            .and_then(archive_relative)
            .ok_or_else(|| format!("'{}' is not inside '{}'", input.display(), src_root.display()))?;

        if !full.is_dir() {
            if relative.is_empty() {
                return Err(format!("'{}' names no file", input.display()));
            }
            list.push(relative);
            continue;
        }

        for entry in WalkDir::new(&full).sort_by_file_name() {
            let entry = entry.map_err(|e| format!("Cannot walk '{}': {}", full.display(), e))?;
            let Some(relative) = entry
                .path()
                .strip_prefix(src_root)
                .ok()
                .and_then(archive_relative)
            else {
                continue;
            };
            if relative.is_empty() {
                continue;
            }
            if entry.file_type().is_dir() {
                list.push(format!("{}\\", relative));
            } else {
                list.push(relative);
            }
        }
    }
    Ok(list)
}

/// Add command implementation
pub fn add(config: &AddConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let add_list = match collect_add_list(config.src_root, config.files) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };
    if add_list.is_empty() {
        eprintln!("Error: nothing to add");
        return ExitCode::BadArgs;
    }

    let options = PackOptions::new()
        .save_paths(!config.flatten)
        .move_files(config.move_files)
        .level(config.level);
    let progress = CliProgress::percent(config.quiet);
    let session = SessionOptions::new().callback(progress.clone());

    match pack_files(
        config.archive_path,
        config.sub_path,
        config.src_root,
        &add_list,
        &options,
        session,
    ) {
        Ok(summary) => {
            progress.finish();
            println!("{}", formatter.format_pack_result(&summary));
            ExitCode::Success
        }
        Err(e) => report_error(&e, Some(&progress)),
    }
}

/// Delete command implementation
pub fn delete(archive_path: &Path, entries: &[String], format: OutputFormat, quiet: bool) -> ExitCode {
    let formatter = create_formatter(format);
    let progress = CliProgress::percent(quiet);
    let session = SessionOptions::new().callback(progress.clone());

    match delete_files(archive_path, entries, session) {
        Ok(marked) => {
            progress.finish();
            println!("{}", formatter.format_delete_result(marked));
            ExitCode::Success
        }
        Err(e) => report_error(&e, Some(&progress)),
    }
}

/// Probe command implementation
pub fn probe(path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let recognized = can_handle_file(path);
    println!("{}", formatter.format_probe(&path.display().to_string(), recognized));
    if recognized {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}
