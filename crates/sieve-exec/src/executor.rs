// executor.rs — Run one manifest command against one staged package.
//
// The executor never returns an error for a failing command. Non-zero exit,
// a broken output stream, and a command that could not even be spawned all
// end up as `CommandOutcome { success: false, .. }` plus a labeled message.

use std::path::Path;
use std::sync::Arc;

use sieve_config::SieveConfig;
use sieve_manifest::ManifestCommand;
use sieve_output::{Label, Redactor, Reporter, Tone};
use sieve_sandbox::Package;

use crate::error::ExecError;
use crate::pty::{PtySession, StreamOutcome};
use crate::title::set_process_title;
use crate::workdir::working_dir_for;

const NON_ZERO_NOTICE: &str =
    "Terminated with a non-zero exit status. Sieve assumes this is a failure.";

/// Result of running a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub label: String,
    pub success: bool,
    /// `None` when the command never started or was killed by a signal.
    pub exit_code: Option<i32>,
}

pub struct Executor<'a> {
    config: &'a SieveConfig,
    reporter: Arc<dyn Reporter>,
}

impl<'a> Executor<'a> {
    pub fn new(config: &'a SieveConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    /// Run `command` for `package`, streaming its output under its label.
    pub fn run(&self, command: &ManifestCommand, package: &Package) -> CommandOutcome {
        let label = Label::new(command.label.as_str());
        let redactor = Redactor::from_pairs([
            (self.config.sandbox_root.join(&package.name).as_path(), package.source_path.as_path()),
            (self.config.sandbox_root.as_path(), package.original_parent()),
        ]);
        let working_dir = working_dir_for(&command.command, package, self.config);

        set_process_title(&command.label);
        self.reporter.title(&command.label);

        tracing::debug!(label = %label, command = %command.command, "running command");
        self.speak(&label, &redactor, &command.command);

        let (exit_code, success) =
            match self.execute(&command.command, &working_dir, &label, &redactor) {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(label = %label, error = %e, "command did not run");
                    self.reporter.labeled(&label, Tone::Error, &e.to_string());
                    (None, false)
                }
            };

        if success {
            self.reporter.labeled(&label, Tone::Success, "SUCCESS!");
        } else {
            if exit_code != Some(0) {
                self.reporter.labeled(&label, Tone::Error, NON_ZERO_NOTICE);
            }
            self.reporter.labeled(&label, Tone::Error, "FAILURE!");
        }

        CommandOutcome {
            label: command.label.clone(),
            success,
            exit_code,
        }
    }

    /// Spawn, drain and reap. Returns the exit code and the verdict.
    fn execute(
        &self,
        command: &str,
        working_dir: &Path,
        label: &Label,
        redactor: &Redactor,
    ) -> Result<(Option<i32>, bool), ExecError> {
        let mut session = PtySession::spawn(command, working_dir)?;
        for line in session.lines() {
            self.speak(label, redactor, &line);
        }

        if let Some(StreamOutcome::IoError(e)) = session.outcome() {
            self.reporter
                .labeled(label, Tone::Error, &format!("Output stream failed: {e}"));
        }

        let status = session.wait()?;
        Ok((status.code(), verdict(status.code(), session.outcome())))
    }

    /// Emit each non-blank line of `text`, redacted, in the label column.
    fn speak(&self, label: &Label, redactor: &Redactor, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            self.reporter.labeled(label, Tone::Plain, &redactor.apply(line));
        }
    }
}

/// A command passes only on a zero exit with an intact output stream.
fn verdict(exit_code: Option<i32>, outcome: Option<&StreamOutcome>) -> bool {
    exit_code == Some(0) && !outcome.is_some_and(StreamOutcome::is_failure)
}
