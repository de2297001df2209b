// runner.rs — One sieve run, from package names to verdict.
//
// Fatal errors (resolution, staging, missing manifest) are returned before
// any command runs. Once commands start, failures only ever show up in the
// report: the run always reaches Reporting, prints a verdict, and persists
// the replay log next to the sandbox.

use std::fs;
use std::sync::Arc;

use sieve_config::{RunOptions, SieveConfig};
use sieve_exec::Executor;
use sieve_manifest::{apply_filter, Manifest, ManifestCommand};
use sieve_output::Reporter;
use sieve_sandbox::{Package, PackageResolver, Sandbox};

use crate::error::{RunError, EXIT_FAILURE, EXIT_SUCCESS};
use crate::report::RunReport;
use crate::state::RunState;

pub const FAIL_FAST_MESSAGE: &str =
    "Exited early because '--fail-fast' was specified. Some tests may have been skipped!";

const VERDICT_OK: &str = "Sieve marked build OK";
const VERDICT_FAILED: &str = "Sieve marked build as failure";

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: RunReport,
    /// Stopped early by fail-fast.
    pub aborted: bool,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.report.success()
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }
}

pub struct Runner<'a> {
    config: &'a SieveConfig,
    options: &'a RunOptions,
    reporter: Arc<dyn Reporter>,
    state: RunState,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a SieveConfig, options: &'a RunOptions, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            options,
            reporter,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    fn transition(&mut self, next: RunState) -> Result<(), RunError> {
        if !self.state.can_transition_to(&next) {
            return Err(RunError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!(from = %self.state, to = %next, "run state");
        self.state = next;
        Ok(())
    }

    /// Stage `names`, run every package's commands and report.
    pub fn run(
        &mut self,
        names: &[String],
        resolver: &dyn PackageResolver,
    ) -> Result<RunSummary, RunError> {
        self.transition(RunState::Staging)?;
        let packages = Sandbox::new(self.config).stage(names, resolver)?;
        let plan = self.load_manifests(packages)?;

        let mut report = RunReport::new();
        let mut aborted = false;

        'packages: for (package, commands) in &plan {
            self.transition(RunState::Running {
                package: package.name.clone(),
            })?;
            tracing::debug!(package = %package.name, version = %package.version, "starting package");
            self.reporter.header(&format!(
                "# Straining '{} (v{})'",
                package.name, package.version
            ));

            let executor = Executor::new(self.config, self.reporter.clone());
            for command in commands {
                let outcome = executor.run(command, package);
                report.record(&package.name, &outcome.label, outcome.success);

                if self.options.fail_fast && !outcome.success {
                    tracing::debug!("command failed and --fail-fast was given");
                    self.reporter.error(FAIL_FAST_MESSAGE);
                    self.transition(RunState::Aborted)?;
                    aborted = true;
                    break 'packages;
                }
            }
        }

        self.transition(RunState::Reporting)?;
        let summary = RunSummary { report, aborted };
        self.finish(&summary)?;
        self.transition(RunState::Done)?;
        Ok(summary)
    }

    /// Load (and filter) every manifest before anything runs, so a missing
    /// manifest aborts the run up front.
    fn load_manifests(
        &self,
        packages: Vec<Package>,
    ) -> Result<Vec<(Package, Vec<ManifestCommand>)>, RunError> {
        packages
            .into_iter()
            .map(|package| -> Result<_, RunError> {
                let manifest = Manifest::for_package(
                    &self.config.manifest,
                    &package.name,
                    &package.source_path,
                    &self.config.sandbox_root,
                )?;
                let commands = apply_filter(manifest.commands(), self.options);
                tracing::debug!(
                    package = %package.name,
                    manifest = %manifest.path().display(),
                    commands = commands.len(),
                    "loaded manifest"
                );
                Ok((package, commands))
            })
            .collect()
    }

    fn finish(&self, summary: &RunSummary) -> Result<(), RunError> {
        if summary.success() {
            self.reporter.say(VERDICT_OK);
        } else {
            self.reporter.say(VERDICT_FAILED);
        }

        if let Err(e) = self.reporter.flush() {
            tracing::warn!(error = %e, "could not flush output");
        }
        self.persist_replay_log();

        if let Some(path) = &self.options.report_path {
            let path = self.config.working_dir.join(path);
            summary.report.write_json(&path)?;
            tracing::debug!(path = %path.display(), "wrote run report");
        }
        Ok(())
    }

    /// Copy the replay log into the sandbox root.
    fn persist_replay_log(&self) {
        let source = &self.config.replay_log;
        if !source.is_file() {
            return;
        }
        let target = self.config.persisted_log_path();
        match fs::copy(source, &target) {
            Ok(_) => tracing::debug!(to = %target.display(), "persisted replay log"),
            Err(e) => tracing::warn!(error = %e, to = %target.display(), "could not persist replay log"),
        }
    }
}
