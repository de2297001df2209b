// logging.rs — Tracing setup for the sieve binary.
//
// Without debug, only warnings (or whatever RUST_LOG asks for) reach stderr,
// so they never interleave with command output. With `--debug` or
// SIEVE_DEBUG, every sieve crate logs at debug level into
// `<tmp>/sieve/debug.log` instead.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use sieve_config::{state_dir, DEBUG_ENV};
use tracing_subscriber::EnvFilter;

const SIEVE_CRATES: &[&str] = &[
    "sieve_cli",
    "sieve_config",
    "sieve_output",
    "sieve_manifest",
    "sieve_sandbox",
    "sieve_exec",
    "sieve_runner",
];

/// Whether SIEVE_DEBUG asks for debug output.
pub fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| !value.is_empty() && value != "0")
        .unwrap_or(false)
}

pub fn debug_log_path() -> PathBuf {
    state_dir().join("debug.log")
}

/// Install the global subscriber. Returns the debug log path when debug
/// output is on.
pub fn init(debug: bool) -> anyhow::Result<Option<PathBuf>> {
    if !debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(None);
    }

    let path = debug_log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let file =
        File::create(&path).with_context(|| format!("cannot open debug log {}", path.display()))?;

    let mut filter = EnvFilter::new("warn");
    for name in SIEVE_CRATES {
        filter = filter.add_directive(format!("{name}=debug").parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(Some(path))
}
