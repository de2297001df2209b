// error.rs — Error types for manifest loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest at any candidate location.
    #[error("could not find a manifest named '{filename}' for package '{package}' (looked in: {})",
        .candidates.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NotFound {
        filename: String,
        package: String,
        candidates: Vec<PathBuf>,
    },

    /// The manifest exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}
