// test.rs — `sieve test`: stage the packages, run their commands, report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use sieve_config::{Overrides, RunOptions, SieveConfig};
use sieve_output::{ConsoleReporter, FanoutReporter, LogReporter, Reporter};
use sieve_runner::{Runner, EXIT_CONFIG};
use sieve_sandbox::DirectoryResolver;

use super::{load_config, Globals};

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Packages to test. Defaults to the current directory as a package.
    pub packages: Vec<String>,

    /// Extra package store, searched before the configured ones.
    #[arg(short = 'p', long, value_name = "PATH")]
    pub package_path: Option<PathBuf>,

    /// Manifest filename or path.
    #[arg(short = 's', long, value_name = "FILE")]
    pub manifest: Option<String>,

    /// Sandbox root (rebuilt on every run).
    #[arg(short = 'S', long, value_name = "PATH")]
    pub sandbox: Option<PathBuf>,

    /// Only run commands with these labels.
    #[arg(short, long, value_delimiter = ',', conflicts_with = "except")]
    pub only: Vec<String>,

    /// Skip commands with these labels.
    #[arg(short, long, value_delimiter = ',')]
    pub except: Vec<String>,

    /// Stop the whole run at the first failing command.
    #[arg(short = 'x', long)]
    pub fail_fast: bool,

    /// Force colored output.
    #[arg(short = 'C', long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Write the run report as JSON to FILE.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl TestArgs {
    fn overrides(&self, debug: bool) -> Overrides {
        let color = match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            sandbox: self.sandbox.clone(),
            manifest: self.manifest.clone(),
            color,
            debug,
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            package_path: self.package_path.clone(),
            only: self.only.clone(),
            except: self.except.clone(),
            fail_fast: self.fail_fast,
            report_path: self.report.clone(),
        }
    }
}

pub fn execute(args: &TestArgs, globals: &Globals) -> anyhow::Result<i32> {
    let working_dir = std::env::current_dir().context("cannot determine the current directory")?;
    let config = match load_config(&working_dir, globals, args.overrides(globals.debug)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sieve: {e}");
            return Ok(EXIT_CONFIG);
        }
    };
    let options = args.run_options();
    tracing::debug!(packages = ?args.packages, ?options, "starting test run");

    let reporter = build_reporter(&config);
    let resolver = DirectoryResolver::from_config(&config, &options);
    let mut runner = Runner::new(&config, &options, reporter.clone());

    match runner.run(&args.packages, &resolver) {
        Ok(summary) => Ok(summary.exit_code()),
        Err(e) => {
            tracing::debug!(error = ?e, state = %runner.state(), "run failed");
            reporter.error(&e.to_string());
            if let Err(flush) = reporter.flush() {
                tracing::warn!(error = %flush, "could not flush output");
            }
            Ok(e.exit_code())
        }
    }
}

/// Console output plus the replay log. A replay log that cannot be opened
/// is reported and skipped.
fn build_reporter(config: &SieveConfig) -> Arc<dyn Reporter> {
    let console: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new(config.color));
    let mut fanout = FanoutReporter::new(vec![console]);
    match LogReporter::create(&config.replay_log) {
        Ok(log) => fanout.push(Arc::new(log)),
        Err(e) => tracing::warn!(error = %e, "replay log disabled"),
    }
    Arc::new(fanout)
}
