// resolver.rs — Package name → Package lookup.
//
// Resolution is an external concern: sieve only needs "given a name, where
// is it and what does it depend on". `PackageResolver` is that seam.
// `DirectoryResolver` is the built-in implementation, searching a list of
// store directories for `<store>/<name>/metadata.toml`.

use std::path::PathBuf;

use sieve_config::{RunOptions, SieveConfig};

use crate::error::SandboxError;
use crate::package::Package;

/// Looks packages up by name.
pub trait PackageResolver {
    fn resolve(&self, name: &str) -> Result<Package, SandboxError>;
}

/// Searches store directories in order; the first one containing the
/// package wins.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    search_paths: Vec<PathBuf>,
}

impl DirectoryResolver {
    /// Keep only existing directories, dropping duplicates (first one wins).
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut search_paths: Vec<PathBuf> = Vec::new();
        for path in paths {
            if path.is_dir() && !search_paths.contains(&path) {
                search_paths.push(path);
            }
        }
        tracing::debug!(?search_paths, "package search paths");
        Self { search_paths }
    }

    /// Search order: the explicit `--package-path`, then the configured
    /// stores, then `<working_dir>/packages`.
    pub fn from_config(config: &SieveConfig, options: &RunOptions) -> Self {
        let explicit = options
            .package_path
            .iter()
            .map(|p| config.working_dir.join(p));
        let stores = config.package_paths.iter().cloned();
        let fallback = std::iter::once(config.working_dir.join("packages"));
        Self::new(explicit.chain(stores).chain(fallback))
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl PackageResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Result<Package, SandboxError> {
        let found = self
            .search_paths
            .iter()
            .map(|store| store.join(name))
            .find(|candidate| candidate.exists());

        match found {
            Some(dir) => {
                tracing::debug!(name, path = %dir.display(), "found package");
                Package::from_dir(dir)
            }
            None => Err(SandboxError::PackageNotFound {
                name: name.to_string(),
                searched: self.search_paths.clone(),
            }),
        }
    }
}
