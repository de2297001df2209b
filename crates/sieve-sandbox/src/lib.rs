//! # sieve-sandbox
//!
//! Stages packages under test into an isolated, rebuilt-per-run directory.
//!
//! Staging resolves the requested package names through a
//! [`PackageResolver`], expands them to their transitive dependency
//! closure, wipes and recreates the sandbox root, copies a few shared
//! top-level files, writes a tool config pointing at the sandbox, and finally
//! copies every package tree (minus [`ExcludePatterns`]) into
//! `<sandbox>/<package>`.
//!
//! ## Key components
//!
//! - [`Package`] — a unit under test and its staging state
//! - [`PackageResolver`] / [`DirectoryResolver`] — name → package lookup
//! - [`dependency_closure`] — cycle-safe fixed-point expansion
//! - [`Sandbox`] — reset, global files, tool config, package copies

pub mod closure;
pub mod error;
pub mod excludes;
pub mod package;
pub mod resolver;
pub mod sandbox;

pub use closure::dependency_closure;
pub use error::SandboxError;
pub use excludes::{ExcludePatterns, IGNORE_FILENAME};
pub use package::{Package, PackageMetadata, METADATA_FILENAME};
pub use resolver::{DirectoryResolver, PackageResolver};
pub use sandbox::{Sandbox, ToolConfig};
