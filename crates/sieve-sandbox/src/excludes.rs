// excludes.rs — Name patterns kept out of staged package copies.
//
// Pattern forms, matched against a single path component:
//   `dir/`   an entry with exactly this name (any depth)
//   `*.ext`  any entry whose name ends with `.ext`
//   `name`   an entry with exactly this name
// A package may add its own patterns in a `.sieveignore` file, one per line,
// with `#` comments and blank lines ignored.

use std::fs;
use std::path::Path;

/// Per-package ignore file.
pub const IGNORE_FILENAME: &str = ".sieveignore";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludePatterns {
    patterns: Vec<String>,
}

impl ExcludePatterns {
    pub fn from_patterns(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse ignore-file content.
    pub fn parse(content: &str) -> Self {
        Self::from_patterns(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Read `<dir>/.sieveignore`. Missing or unreadable files give no patterns.
    pub fn load_ignore(dir: &Path) -> Self {
        let path = dir.join(IGNORE_FILENAME);
        match fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loaded ignore file");
                Self::parse(&content)
            }
            Err(_) => Self::default(),
        }
    }

    /// These patterns plus `other`'s.
    pub fn merged(&self, other: &ExcludePatterns) -> Self {
        let mut patterns = self.patterns.clone();
        for pattern in &other.patterns {
            if !patterns.contains(pattern) {
                patterns.push(pattern.clone());
            }
        }
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn should_exclude(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            if let Some(dir_name) = pattern.strip_suffix('/') {
                name == dir_name
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                name.ends_with(suffix)
            } else {
                name == pattern
            }
        })
    }
}
