// error.rs — Error types for reporter setup.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// The replay log could not be created or opened.
    #[error("cannot open replay log {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The ANSI-stripping pattern failed to compile.
    #[error("invalid escape pattern: {0}")]
    Pattern(#[from] regex::Error),
}
