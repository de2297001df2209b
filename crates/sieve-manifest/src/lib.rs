//! # sieve-manifest
//!
//! Parsing of the Sievefile: one `label: command` pair per line, `#`
//! comments and blank lines ignored, with the `$PACKAGE` and `$SANDBOX`
//! tokens substituted literally before anything else happens.
//!
//! [`Manifest::for_package`] finds and loads the file for a package;
//! [`apply_filter`] narrows the parsed commands down to the ones a run
//! should execute.

pub mod error;
pub mod filter;
pub mod manifest;

pub use error::ManifestError;
pub use filter::apply_filter;
pub use manifest::{substitute, Manifest, ManifestCommand, PACKAGE_TOKEN, SANDBOX_TOKEN};
