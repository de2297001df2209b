//! # sieve-cli
//!
//! The `sieve` binary: runs each package's Sievefile commands inside a
//! freshly staged sandbox and reports a single verdict.
//!
//! - `sieve test [PACKAGES...]` — stage, run, report
//! - `sieve info` — version, license and the resolved configuration
//! - `sieve version` — just the version

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sieve_runner::EXIT_FAILURE;

/// Isolated, labeled test runner for package collections.
#[derive(Parser)]
#[command(name = "sieve", version, about)]
struct Cli {
    /// Path to the config file (defaults to ./.sieve.toml).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write debug logs to <tmp>/sieve/debug.log (also SIEVE_DEBUG=1).
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the manifest commands of the given packages.
    Test(commands::test::TestArgs),
    /// Show version, license and the resolved configuration.
    Info,
    /// Show the version.
    Version,
}

fn main() {
    let cli = Cli::parse();
    let debug = cli.debug || logging::debug_from_env();
    if let Err(e) = logging::init(debug) {
        eprintln!("sieve: debug logging disabled: {e:#}");
    }

    let globals = commands::Globals {
        config: cli.config,
        debug,
    };
    let result = match &cli.command {
        Commands::Test(args) => commands::test::execute(args, &globals),
        Commands::Info => commands::info::execute(&globals),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sieve: {e:#}");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
