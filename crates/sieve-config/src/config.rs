// config.rs — Resolved configuration for a sieve run.
//
// SieveConfig is built exactly once: defaults, then `.sieve.toml` from the
// working directory (if present), then command-line overrides. Every path in
// the result is absolute so that later components never consult the
// process working directory themselves.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the optional per-project config file.
pub const CONFIG_FILENAME: &str = ".sieve.toml";

/// Environment variable that turns on debug tracing.
pub const DEBUG_ENV: &str = "SIEVE_DEBUG";

/// Default manifest filename.
pub const DEFAULT_MANIFEST: &str = "Sievefile";

/// Tools that must run from inside the package directory rather than the
/// sandbox root.
const DEFAULT_PACKAGE_SCOPED: &[&str] = &["rspec", "kitchen"];

/// Top-level files and directories copied from the working directory into
/// the sandbox root. The manifest filename is always added in front.
const DEFAULT_GLOBAL_FILES: &[&str] = &[
    "foodcritic",
    ".cane",
    ".rubocop.yml",
    ".kitchen.yml",
    "Berksfile",
    "README.md",
    ".rspec",
    "spec",
    "test",
];

/// Entries never copied when staging a package. The manifest filename is
/// always added on top of these.
const DEFAULT_EXCLUDES: &[&str] = &[
    // Version control
    ".git/",
    ".svn/",
    ".hg/",
    // Lock files
    "*.lock",
    // Fixture state managed by the test tools themselves
    ".kitchen/",
    ".sieve/",
];

/// The on-disk `.sieve.toml` format. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Sandbox root directory.
    pub sandbox: Option<PathBuf>,

    /// Manifest filename (or path).
    pub manifest: Option<String>,

    /// Package store directories, searched in order.
    pub package_paths: Vec<PathBuf>,

    /// Replaces the default package-scoped tool list.
    pub package_scoped_commands: Option<Vec<String>>,

    /// Replaces the default global file allow-list.
    pub global_files: Option<Vec<String>>,

    /// Extra exclude patterns, added to the defaults.
    pub excludes: Vec<String>,

    /// Enable ANSI color on the console.
    pub color: Option<bool>,
}

impl ConfigFile {
    /// Load a config file. Fails if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file if it exists, otherwise return defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config file");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values from the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sandbox: Option<PathBuf>,
    pub manifest: Option<String>,
    pub color: Option<bool>,
    pub debug: bool,
}

/// Immutable configuration shared by every component of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SieveConfig {
    /// Directory sieve was invoked from. Global files are copied from here
    /// and `<working_dir>/packages` is the last package search path.
    pub working_dir: PathBuf,

    /// Root of the sandbox tree. Destroyed and rebuilt on every run.
    pub sandbox_root: PathBuf,

    /// Manifest filename, or an absolute path to a single manifest.
    pub manifest: String,

    /// Configured package store directories (absolute).
    pub package_paths: Vec<PathBuf>,

    /// Command substrings that select the package directory as cwd.
    pub package_scoped_commands: Vec<String>,

    /// Top-level files copied into the sandbox root.
    pub global_files: Vec<String>,

    /// Exclude patterns applied when copying packages.
    pub excludes: Vec<String>,

    /// Colorize console output.
    pub color: bool,

    /// Debug tracing enabled.
    pub debug: bool,

    /// Plain-text replay log written during the run.
    pub replay_log: PathBuf,
}

impl SieveConfig {
    /// Defaults for a run started in `working_dir`.
    ///
    /// The sandbox and replay log live under `<tmp>/sieve/`.
    pub fn for_dir(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let state_dir = state_dir();
        Self {
            working_dir,
            sandbox_root: state_dir.join("sandbox"),
            manifest: DEFAULT_MANIFEST.to_string(),
            package_paths: Vec::new(),
            package_scoped_commands: to_strings(DEFAULT_PACKAGE_SCOPED),
            global_files: with_manifest(DEFAULT_MANIFEST, to_strings(DEFAULT_GLOBAL_FILES)),
            excludes: with_manifest(DEFAULT_MANIFEST, to_strings(DEFAULT_EXCLUDES)),
            color: true,
            debug: false,
            replay_log: state_dir.join("sieve.out"),
        }
    }

    /// Build the config for `working_dir` from a config file and overrides.
    pub fn resolve(
        working_dir: impl AsRef<Path>,
        file: ConfigFile,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
        let working_dir = absolutize(&cwd, working_dir.as_ref());
        let mut config = Self::for_dir(&working_dir);

        let manifest = overrides
            .manifest
            .or(file.manifest)
            .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

        if let Some(sandbox) = overrides.sandbox.or(file.sandbox) {
            config.sandbox_root = absolutize(&working_dir, &sandbox);
        }
        config.package_paths = file
            .package_paths
            .iter()
            .map(|p| absolutize(&working_dir, p))
            .collect();
        if let Some(scoped) = file.package_scoped_commands {
            config.package_scoped_commands = scoped;
        }

        let globals = file
            .global_files
            .unwrap_or_else(|| to_strings(DEFAULT_GLOBAL_FILES));
        config.global_files = with_manifest(&manifest, globals);

        let mut excludes = to_strings(DEFAULT_EXCLUDES);
        excludes.extend(file.excludes);
        config.excludes = with_manifest(&manifest, excludes);

        config.manifest = manifest;
        config.color = overrides.color.or(file.color).unwrap_or(true);
        config.debug = overrides.debug;

        tracing::debug!(?config, "resolved configuration");
        Ok(config)
    }

    /// Location of the generated tool config inside the sandbox.
    pub fn tool_config_path(&self) -> PathBuf {
        self.sandbox_root.join(".sieve").join("config.toml")
    }

    /// Where the replay log is copied once the run is over.
    pub fn persisted_log_path(&self) -> PathBuf {
        self.sandbox_root.join("sieve.out")
    }
}

/// `<tmp>/sieve`, the home of the default sandbox and logs.
pub fn state_dir() -> PathBuf {
    std::env::temp_dir().join("sieve")
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Put the manifest's file name at the front of a list, without duplicating it.
fn with_manifest(manifest: &str, mut items: Vec<String>) -> Vec<String> {
    let name = Path::new(manifest)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| manifest.to_string());
    items.retain(|item| item != &name);
    items.insert(0, name);
    items
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
