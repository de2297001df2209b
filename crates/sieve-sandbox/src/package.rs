// package.rs — A unit under test and its staging state.
//
// A Package starts life pointing at its original directory. Staging copies
// it into the sandbox and records the copy's location exactly once; from
// then on `location()` is the sandbox copy, while `source_path` is kept so
// output can be rewritten back to the user's real files.

use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Metadata file every package directory carries.
pub const METADATA_FILENAME: &str = "metadata.toml";

/// On-disk package metadata (`metadata.toml`).
///
/// ```toml
/// name = "webapp"
/// version = "1.4.0"
///
/// [dependencies]
/// base = ">= 1.0"
/// users = "*"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Defaults to the directory name.
    pub name: Option<String>,

    /// Defaults to `0.0.0`.
    pub version: Option<String>,

    /// Dependency name → version constraint. Constraints are informational;
    /// only the names (in declaration order) drive staging.
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

/// A named, versioned unit under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Where the package was found.
    pub source_path: PathBuf,
    /// Where the package was copied to; `None` until staged.
    sandbox_path: Option<PathBuf>,
    /// Declared dependencies, in declaration order.
    pub dependency_names: Vec<String>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source_path: source_path.into(),
            sandbox_path: None,
            dependency_names: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependency_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Read a package from its directory's `metadata.toml`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let dir = dir.as_ref();
        let metadata_path = dir.join(METADATA_FILENAME);
        let content = fs::read_to_string(&metadata_path).map_err(|e| {
            SandboxError::InvalidMetadata {
                path: dir.to_path_buf(),
                reason: format!("cannot read {}: {}", METADATA_FILENAME, e),
            }
        })?;
        let metadata: PackageMetadata =
            toml::from_str(&content).map_err(|e| SandboxError::InvalidMetadata {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;

        let name = match metadata.name {
            Some(name) => name,
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| SandboxError::InvalidMetadata {
                    path: dir.to_path_buf(),
                    reason: "package has no name".to_string(),
                })?,
        };
        if !is_plain_name(&name) {
            return Err(SandboxError::InvalidMetadata {
                path: dir.to_path_buf(),
                reason: format!("'{name}' is not a usable package name"),
            });
        }

        Ok(Package::new(
            name,
            metadata.version.unwrap_or_else(|| "0.0.0".to_string()),
            dir,
        )
        .with_dependencies(metadata.dependencies.into_keys()))
    }

    /// Current location: the sandbox copy once staged, the source before.
    pub fn location(&self) -> &Path {
        self.sandbox_path.as_deref().unwrap_or(&self.source_path)
    }

    pub fn sandbox_path(&self) -> Option<&Path> {
        self.sandbox_path.as_deref()
    }

    pub fn is_staged(&self) -> bool {
        self.sandbox_path.is_some()
    }

    /// Record where staging put this package. Allowed once per pass.
    pub fn mark_staged(&mut self, path: impl Into<PathBuf>) -> Result<(), SandboxError> {
        if let Some(existing) = &self.sandbox_path {
            return Err(SandboxError::AlreadyStaged {
                name: self.name.clone(),
                path: existing.clone(),
            });
        }
        self.sandbox_path = Some(path.into());
        Ok(())
    }

    /// The directory that held the package originally. Sandbox paths not
    /// under this package's own copy are rewritten to this.
    pub fn original_parent(&self) -> &Path {
        self.source_path.parent().unwrap_or(&self.source_path)
    }
}

/// A package is staged at `<root>/<name>`, so the name must be exactly one
/// normal path segment.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('/')
}
