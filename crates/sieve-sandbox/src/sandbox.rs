// sandbox.rs — The isolated directory every run tests against.
//
// The sandbox root is destroyed and rebuilt on each run, so nothing from a
// previous run (or from the user's checkout, beyond what is copied) can leak
// into a test. Staging order:
//
//   1. resolve requested names and compute the dependency closure
//   2. reset the root
//   3. copy shared top-level files from the working directory
//   4. write the tool config
//   5. copy every package in the closure to `<root>/<name>`
//
// Resolution happens before the reset, so an unknown package never costs the
// user their previous sandbox.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sieve_config::SieveConfig;

use crate::closure::dependency_closure;
use crate::error::SandboxError;
use crate::excludes::ExcludePatterns;
use crate::package::{Package, METADATA_FILENAME};
use crate::resolver::PackageResolver;

/// Cache backend recorded in the tool config.
const CACHE_TYPE: &str = "BasicFile";

/// Config handed to tools run inside the sandbox (`<root>/.sieve/config.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub cache_type: String,
    pub cache_path: PathBuf,
    pub package_path: PathBuf,
}

impl ToolConfig {
    pub fn for_root(root: &Path) -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            cache_type: CACHE_TYPE.to_string(),
            cache_path: home.join(".sieve").join("checksums"),
            package_path: root.to_path_buf(),
        }
    }
}

/// Builds and owns the sandbox tree for one run.
pub struct Sandbox<'a> {
    config: &'a SieveConfig,
    excludes: ExcludePatterns,
}

impl<'a> Sandbox<'a> {
    pub fn new(config: &'a SieveConfig) -> Self {
        Self {
            config,
            excludes: ExcludePatterns::from_patterns(config.excludes.iter().cloned()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.config.sandbox_root
    }

    /// Stage `names` and their dependencies. Returns the requested packages
    /// (deduplicated, in request order) with their sandbox paths set.
    ///
    /// With no names, the working directory itself must be a package.
    pub fn stage(
        &self,
        names: &[String],
        resolver: &dyn PackageResolver,
    ) -> Result<Vec<Package>, SandboxError> {
        let requested = self.requested_packages(names, resolver)?;
        let requested_len = requested.len();
        let closure = dependency_closure(requested, resolver)?;
        tracing::debug!(
            packages = ?closure.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "dependency closure"
        );

        self.reset()?;
        self.copy_global_files();
        self.write_tool_config()?;
        let mut staged = self.copy_packages(closure)?;
        staged.truncate(requested_len);
        Ok(staged)
    }

    fn requested_packages(
        &self,
        names: &[String],
        resolver: &dyn PackageResolver,
    ) -> Result<Vec<Package>, SandboxError> {
        if names.is_empty() {
            let dir = &self.config.working_dir;
            if !dir.join(METADATA_FILENAME).is_file() {
                return Err(SandboxError::NoPackages {
                    dir: dir.clone(),
                    metadata: METADATA_FILENAME,
                });
            }
            tracing::debug!(dir = %dir.display(), "testing the working directory as a package");
            return Ok(vec![Package::from_dir(dir)?]);
        }

        let mut requested: Vec<Package> = Vec::new();
        for name in names {
            let package = resolver.resolve(name)?;
            if requested.iter().all(|p| p.name != package.name) {
                requested.push(package);
            }
        }
        Ok(requested)
    }

    /// Remove the root (if present) and recreate it empty.
    pub fn reset(&self) -> Result<(), SandboxError> {
        let root = self.root();
        if root.parent().is_none() {
            return Err(SandboxError::UnsafeRoot {
                path: root.to_path_buf(),
                reason: "it is a filesystem root",
            });
        }
        if self.config.working_dir.starts_with(root) {
            return Err(SandboxError::UnsafeRoot {
                path: root.to_path_buf(),
                reason: "it contains the working directory",
            });
        }
        if dirs::home_dir().as_deref() == Some(root) {
            return Err(SandboxError::UnsafeRoot {
                path: root.to_path_buf(),
                reason: "it is the home directory",
            });
        }

        if root.exists() {
            tracing::debug!(root = %root.display(), "removing previous sandbox");
            fs::remove_dir_all(root).map_err(|source| SandboxError::IoError {
                path: root.to_path_buf(),
                source,
            })?;
        }
        fs::create_dir_all(root).map_err(|source| SandboxError::IoError {
            path: root.to_path_buf(),
            source,
        })
    }

    /// Copy the shared top-level files into the root. Missing entries are
    /// skipped; failures are logged and never fatal.
    pub fn copy_global_files(&self) {
        let manifest_name = self.config.global_files.first();
        for name in &self.config.global_files {
            let source = if Some(name) == manifest_name {
                self.config.working_dir.join(&self.config.manifest)
            } else {
                self.config.working_dir.join(name)
            };
            if !source.exists() {
                tracing::debug!(file = %name, "global file not present, skipping");
                continue;
            }

            let target = self.root().join(name);
            let result = if source.is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|source| SandboxError::IoError {
                        path: target.clone(),
                        source,
                    })
                    .and_then(|_| {
                        copy_dir_recursive(&source, &target, &ExcludePatterns::default(), self.root())
                    })
            } else {
                fs::copy(&source, &target)
                    .map(|_| ())
                    .map_err(|source| SandboxError::IoError {
                        path: target.clone(),
                        source,
                    })
            };
            match result {
                Ok(()) => tracing::debug!(file = %name, "copied global file"),
                Err(e) => tracing::warn!(file = %name, error = %e, "could not copy global file"),
            }
        }
    }

    /// Write `<root>/.sieve/config.toml`, replacing any existing file.
    pub fn write_tool_config(&self) -> Result<PathBuf, SandboxError> {
        let path = self.config.tool_config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SandboxError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string(&ToolConfig::for_root(self.root()))?;
        fs::write(&path, content).map_err(|source| SandboxError::IoError {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote tool config");
        Ok(path)
    }

    /// Copy each package to `<root>/<name>` and mark it staged. A name that
    /// is already taken in the root (a global file or another package) is
    /// an error.
    pub fn copy_packages(&self, packages: Vec<Package>) -> Result<Vec<Package>, SandboxError> {
        let mut staged = Vec::with_capacity(packages.len());
        for mut package in packages {
            if let Some(existing) = package.sandbox_path() {
                return Err(SandboxError::AlreadyStaged {
                    name: package.name.clone(),
                    path: existing.to_path_buf(),
                });
            }
            let target = self.root().join(&package.name);
            if fs::symlink_metadata(&target).is_ok() {
                return Err(SandboxError::NameCollision {
                    name: package.name.clone(),
                    path: target,
                });
            }
            let excludes = self
                .excludes
                .merged(&ExcludePatterns::load_ignore(&package.source_path));

            fs::create_dir_all(&target).map_err(|source| SandboxError::IoError {
                path: target.clone(),
                source,
            })?;
            copy_dir_recursive(&package.source_path, &target, &excludes, self.root())?;
            package.mark_staged(&target)?;
            tracing::debug!(
                package = %package.name,
                from = %package.source_path.display(),
                to = %target.display(),
                "staged package"
            );
            staged.push(package);
        }
        Ok(staged)
    }
}

/// Recursively copy `src` into `dst`, skipping excluded names and never
/// descending into `sandbox_root` (which may live inside `src`). Symlinks
/// are copied as symlinks.
fn copy_dir_recursive(
    src: &Path,
    dst: &Path,
    excludes: &ExcludePatterns,
    sandbox_root: &Path,
) -> Result<(), SandboxError> {
    let entries = fs::read_dir(src).map_err(|source| SandboxError::IoError {
        path: src.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| SandboxError::IoError {
            path: src.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        if excludes.should_exclude(&file_name.to_string_lossy()) {
            continue;
        }

        let src_path = entry.path();
        if src_path == sandbox_root {
            continue;
        }
        let dst_path = dst.join(&file_name);
        let file_type = entry.file_type().map_err(|source| SandboxError::IoError {
            path: src_path.clone(),
            source,
        })?;

        if file_type.is_symlink() {
            // Links are recreated as links, never followed.
            let link = fs::read_link(&src_path).map_err(|source| SandboxError::IoError {
                path: src_path.clone(),
                source,
            })?;
            std::os::unix::fs::symlink(&link, &dst_path).map_err(|source| {
                SandboxError::IoError {
                    path: dst_path,
                    source,
                }
            })?;
        } else if file_type.is_dir() {
            fs::create_dir_all(&dst_path).map_err(|source| SandboxError::IoError {
                path: dst_path.clone(),
                source,
            })?;
            copy_dir_recursive(&src_path, &dst_path, excludes, sandbox_root)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(|source| SandboxError::IoError {
                path: dst_path,
                source,
            })?;
        }
    }

    Ok(())
}
