// info.rs — `sieve info`: version, license and the resolved configuration.

use sieve_config::{Overrides, RunOptions};
use sieve_runner::EXIT_CONFIG;
use sieve_sandbox::DirectoryResolver;

use super::{load_config, Globals};
use crate::logging::debug_log_path;

pub fn execute(globals: &Globals) -> anyhow::Result<i32> {
    let working_dir = std::env::current_dir()?;
    let overrides = Overrides {
        debug: globals.debug,
        ..Overrides::default()
    };
    let config = match load_config(&working_dir, globals, overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sieve: {e}");
            return Ok(EXIT_CONFIG);
        }
    };
    let resolver = DirectoryResolver::from_config(&config, &RunOptions::default());

    println!("Sieve ({})", env!("CARGO_PKG_VERSION"));
    println!("Licensed under the {} license.", env!("CARGO_PKG_LICENSE"));
    println!();
    println!("working dir:      {}", config.working_dir.display());
    println!("sandbox:          {}", config.sandbox_root.display());
    println!("manifest:         {}", config.manifest);
    println!("replay log:       {}", config.replay_log.display());
    if config.debug {
        println!("debug log:        {}", debug_log_path().display());
    }
    println!("package paths:");
    for path in resolver.search_paths() {
        println!("  {}", path.display());
    }
    println!("package-scoped:   {}", config.package_scoped_commands.join(", "));
    println!("global files:     {}", config.global_files.join(", "));
    println!("excludes:         {}", config.excludes.join(", "));
    Ok(0)
}
