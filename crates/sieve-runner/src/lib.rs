//! # sieve-runner
//!
//! Drives one sieve run from package names to a verdict.
//!
//! The [`Runner`] stages the requested packages, loads every manifest up
//! front, runs each package's commands in order through the
//! [`Executor`](sieve_exec::Executor), records results in a [`RunReport`]
//! and finishes by printing the verdict and persisting the replay log.
//! Progress is tracked by a validated [`RunState`] machine.
//!
//! ## Key components
//!
//! - [`Runner`] / [`RunSummary`] — the run itself and its result
//! - [`RunReport`] — ordered `package → label → passed` results
//! - [`RunState`] — `Init → Staging → Running* → Reporting → Done`
//! - [`RunError`] — fatal errors, each mapped to a process exit code

pub mod error;
pub mod report;
pub mod runner;
pub mod state;

pub use error::{
    RunError, EXIT_CONFIG, EXIT_FAILURE, EXIT_MANIFEST_NOT_FOUND, EXIT_PACKAGE_NOT_FOUND,
    EXIT_STAGING, EXIT_SUCCESS,
};
pub use report::RunReport;
pub use runner::{RunSummary, Runner, FAIL_FAST_MESSAGE};
pub use state::RunState;
