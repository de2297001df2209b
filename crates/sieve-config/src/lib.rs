//! # sieve-config
//!
//! Configuration for a single sieve run.
//!
//! Everything a run needs to know about its environment (sandbox root,
//! manifest filename, package stores, tool lists) is collected once at
//! startup into an immutable [`SieveConfig`] and handed to every component
//! by reference. Per-invocation choices that only the runner cares about
//! (label filters, fail-fast) live in [`RunOptions`].
//!
//! ## Key components
//!
//! - [`SieveConfig`] — resolved, absolute-path configuration
//! - [`ConfigFile`] — the optional `.sieve.toml` in the working directory
//! - [`Overrides`] — command-line values that win over the file
//! - [`RunOptions`] — label filters, fail-fast, extra package path

pub mod config;
pub mod error;
pub mod options;

pub use config::{state_dir, ConfigFile, Overrides, SieveConfig, CONFIG_FILENAME, DEBUG_ENV};
pub use error::ConfigError;
pub use options::RunOptions;
