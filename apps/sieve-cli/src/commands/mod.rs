pub mod info;
pub mod test;

use std::path::{Path, PathBuf};

use sieve_config::{ConfigError, ConfigFile, Overrides, SieveConfig, CONFIG_FILENAME};

/// Options shared by every subcommand.
pub struct Globals {
    pub config: Option<PathBuf>,
    pub debug: bool,
}

/// Load the config file (explicit path must exist; the default may be
/// absent) and resolve it for `working_dir`.
pub fn load_config(
    working_dir: &Path,
    globals: &Globals,
    overrides: Overrides,
) -> Result<SieveConfig, ConfigError> {
    let file = match &globals.config {
        Some(path) => ConfigFile::load(&working_dir.join(path))?,
        None => ConfigFile::load_or_default(&working_dir.join(CONFIG_FILENAME))?,
    };
    SieveConfig::resolve(working_dir, file, overrides)
}
