//! Entry selection using glob patterns.

use glob::Pattern;
use smpa::EntryInfo;

/// Error type for file selector operations
#[derive(Debug)]
pub struct PatternError(pub String);

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid glob pattern: {}", self.0)
    }
}

impl std::error::Error for PatternError {}

/// Entry selector based on include and exclude glob patterns
///
/// Archive paths are matched with `/` separators and case-insensitively,
/// the way entries are compared inside the archive.
pub struct FileSelector {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileSelector {
    /// Creates a new file selector from pattern strings
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, PatternError> {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| Pattern::new(&p.replace('\\', "/")).map_err(|e| PatternError(e.to_string())))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Checks if an archive path matches the selection criteria
    pub fn matches(&self, path: &str) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        let path = path.replace('\\', "/");

        // If include patterns specified, at least one must match
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches_with(&path, options)) {
            return false;
        }

        // None of the exclude patterns should match
        !self.exclude.iter().any(|p| p.matches_with(&path, options))
    }

    /// Checks if an entry matches the selection criteria
    pub fn select(&self, entry: &EntryInfo) -> bool {
        self.matches(&entry.path)
    }
}
