//! Output formatting for CLI operations.

use serde_json::json;
use smpa::{EntryInfo, PackSummary};

/// Counters collected by the extract command.
#[derive(Debug, Default)]
pub struct ExtractStats {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub skipped: usize,
    pub unsafe_paths: Vec<String>,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a list of entries
    fn format_list(&self, entries: &[EntryInfo], technical: bool) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, stats: &ExtractStats) -> String;

    /// Formats the outcome of an add command
    fn format_pack_result(&self, summary: &PackSummary) -> String;

    /// Formats the outcome of a delete command
    fn format_delete_result(&self, marked: usize) -> String;

    /// Formats a probe verdict
    fn format_probe(&self, path: &str, recognized: bool) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[EntryInfo], technical: bool) -> String {
        let mut output = String::new();

        if technical {
            output.push_str(&format!(
                "{:>12} {:>12} {:>19} {:>5} {:>10} {}\n",
                "Size", "Packed", "Modified", "Attr", "Offset", "Name"
            ));
        } else {
            output.push_str(&format!("{:>12} {:>19} {}\n", "Size", "Modified", "Name"));
        }
        output.push_str(&"-".repeat(70));
        output.push('\n');

        let mut total_size: u64 = 0;
        let mut total_packed: u64 = 0;
        let mut file_count = 0;
        let mut dir_count = 0;

        for entry in entries {
            let size_str = if entry.is_directory() {
                dir_count += 1;
                String::new()
            } else {
                file_count += 1;
                total_size += entry.unp_size;
                total_packed += entry.pack_size;
                humanize_bytes(entry.unp_size)
            };

            if technical {
                output.push_str(&format!(
                    "{:>12} {:>12} {:>19} {:>5} {:>#10x} {}\n",
                    size_str,
                    humanize_bytes(entry.pack_size),
                    entry.time.to_string(),
                    entry.attributes.to_string(),
                    entry.offset,
                    entry.path
                ));
            } else {
                output.push_str(&format!(
                    "{:>12} {:>19} {}\n",
                    size_str,
                    entry.time.to_string(),
                    entry.path
                ));
            }
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:>12} {} files, {} directories",
            humanize_bytes(total_size),
            file_count,
            dir_count
        ));
        if technical && total_size > 0 {
            output.push_str(&format!(
                " ({:.1}% stored)",
                total_packed as f64 * 100.0 / total_size as f64
            ));
        }
        output
    }

    fn format_extract_result(&self, stats: &ExtractStats) -> String {
        let mut output = format!(
            "Extracted {} files, {} directories ({})",
            stats.files,
            stats.directories,
            humanize_bytes(stats.bytes)
        );
        if stats.skipped > 0 {
            output.push_str(&format!("\nSkipped: {}", stats.skipped));
        }
        if !stats.unsafe_paths.is_empty() {
            output.push_str("\nRefused unsafe paths:");
            for path in &stats.unsafe_paths {
                output.push_str(&format!("\n  {}", path));
            }
        }
        output
    }

    fn format_pack_result(&self, summary: &PackSummary) -> String {
        let mut output = format!(
            "{} archive: {} entries written, {} -> {}",
            if summary.created { "Created" } else { "Updated" },
            summary.entries_written,
            humanize_bytes(summary.bytes_read),
            humanize_bytes(summary.bytes_written)
        );
        if summary.replaced > 0 {
            output.push_str(&format!("\nReplaced: {}", summary.replaced));
        }
        output
    }

    fn format_delete_result(&self, marked: usize) -> String {
        format!("Deleted {} entries", marked)
    }

    fn format_probe(&self, path: &str, recognized: bool) -> String {
        if recognized {
            format!("{}: SMPA archive", path)
        } else {
            format!("{}: not an SMPA archive", path)
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[EntryInfo], _technical: bool) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "path": e.path,
                    "size": e.unp_size,
                    "packed_size": e.pack_size,
                    "compressed": e.compressed,
                    "is_directory": e.is_directory(),
                    "attributes": e.attributes.bits(),
                    "modified": e.time.to_string(),
                    "offset": e.offset,
                })
            })
            .collect();
        serde_json::to_string_pretty(&items).unwrap_or_default()
    }

    fn format_extract_result(&self, stats: &ExtractStats) -> String {
        let obj = json!({
            "files": stats.files,
            "directories": stats.directories,
            "bytes": stats.bytes,
            "skipped": stats.skipped,
            "unsafe_paths": stats.unsafe_paths,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_default()
    }

    fn format_pack_result(&self, summary: &PackSummary) -> String {
        let obj = json!({
            "created": summary.created,
            "replaced": summary.replaced,
            "entries_written": summary.entries_written,
            "bytes_read": summary.bytes_read,
            "bytes_written": summary.bytes_written,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_default()
    }

    fn format_delete_result(&self, marked: usize) -> String {
        serde_json::to_string_pretty(&json!({ "deleted": marked })).unwrap_or_default()
    }

    fn format_probe(&self, path: &str, recognized: bool) -> String {
        serde_json::to_string_pretty(&json!({ "path": path, "recognized": recognized }))
            .unwrap_or_default()
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(0), "0 B");
        assert_eq!(humanize_bytes(1536), "1.5 KB");
        assert_eq!(humanize_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_json_delete() {
        let out = JsonFormatter.format_delete_result(3);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["deleted"], 3);
    }
}
