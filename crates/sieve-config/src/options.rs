// options.rs — Per-invocation run options.

use std::path::PathBuf;

/// Options for one `sieve test` invocation.
///
/// `only` and `except` are mutually exclusive at the CLI; if both somehow
/// arrive non-empty, `only` takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Extra package search path, tried before the configured stores.
    pub package_path: Option<PathBuf>,
    /// Run only commands with these labels.
    pub only: Vec<String>,
    /// Skip commands with these labels.
    pub except: Vec<String>,
    /// Abort the whole run on the first failing command.
    pub fail_fast: bool,
    /// Write the run report as JSON to this path when the run ends.
    pub report_path: Option<PathBuf>,
}

impl RunOptions {
    pub fn only(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            only: labels.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn except(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            except: labels.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether any label filter is active.
    pub fn is_filtered(&self) -> bool {
        !self.only.is_empty() || !self.except.is_empty()
    }
}
