// error.rs — Fatal run errors and their exit codes.

use std::path::PathBuf;

use sieve_manifest::ManifestError;
use sieve_sandbox::SandboxError;
use thiserror::Error;

pub const EXIT_SUCCESS: i32 = 0;
/// At least one command failed.
pub const EXIT_FAILURE: i32 = 1;
/// The configuration file could not be read.
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_PACKAGE_NOT_FOUND: i32 = 100;
pub const EXIT_MANIFEST_NOT_FOUND: i32 = 110;
pub const EXIT_STAGING: i32 = 120;

/// Errors that end a run before a verdict is reached.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("cannot serialize run report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write run report to {path}: {source}")]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid run state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl RunError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Sandbox(e) if e.is_resolution() => EXIT_PACKAGE_NOT_FOUND,
            RunError::Sandbox(_) => EXIT_STAGING,
            RunError::Manifest(_) => EXIT_MANIFEST_NOT_FOUND,
            RunError::Serialize(_) | RunError::Report { .. } | RunError::InvalidTransition { .. } => {
                EXIT_FAILURE
            }
        }
    }
}
