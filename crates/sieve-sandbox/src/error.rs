// error.rs — Error types for package resolution and sandbox staging.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving packages or building the sandbox.
///
/// All of these are fatal for the run: sieve never tests against a
/// partially staged sandbox.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// No search path contains the package.
    #[error("could not find package '{name}' in any of the sources: [{}]",
        .searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    PackageNotFound { name: String, searched: Vec<PathBuf> },

    /// The package directory exists but its metadata is missing or unreadable.
    #[error("'{}' existed, but no package could be read from it: {reason}", .path.display())]
    InvalidMetadata { path: PathBuf, reason: String },

    /// No package names were given and the working directory is not a package.
    #[error("no packages given and '{}' is not a package (no {metadata})", .dir.display())]
    NoPackages { dir: PathBuf, metadata: &'static str },

    /// The sandbox root is somewhere it must never be wiped.
    #[error("refusing to use '{}' as sandbox root: {reason}", .path.display())]
    UnsafeRoot { path: PathBuf, reason: &'static str },

    /// A package was staged twice in one pass.
    #[error("package '{name}' is already staged at {}", .path.display())]
    AlreadyStaged { name: String, path: PathBuf },

    /// A package would land on top of something already in the root.
    #[error("package '{name}' collides with existing sandbox entry {}", .path.display())]
    NameCollision { name: String, path: PathBuf },

    /// A file operation on the sandbox failed.
    #[error("staging failed at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The generated tool config could not be serialized.
    #[error("cannot render tool config: {0}")]
    ToolConfig(#[from] toml::ser::Error),
}

impl SandboxError {
    /// Whether this is a resolution failure (as opposed to a staging failure).
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            SandboxError::PackageNotFound { .. }
                | SandboxError::InvalidMetadata { .. }
                | SandboxError::NoPackages { .. }
        )
    }
}
