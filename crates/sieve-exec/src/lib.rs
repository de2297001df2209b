//! # sieve-exec
//!
//! Runs manifest commands for a staged package.
//!
//! Each command is handed to `/bin/sh -c` inside a pseudo-terminal, so tools
//! that only color their output on a TTY still do. Output is read line by
//! line, rewritten so sandbox paths point back at the user's files, and
//! emitted through the run's [`Reporter`](sieve_output::Reporter) in the
//! command's label column.
//!
//! ## Key components
//!
//! - [`PtySession`] — a child process on a PTY with a lazy line iterator
//! - [`StreamOutcome`] — how the output stream ended
//! - [`Executor`] — working-directory choice, echo, streaming, verdict
//! - [`working_dir_for`] — package-scoped vs sandbox-root commands

pub mod error;
pub mod executor;
pub mod pty;
pub mod title;
pub mod workdir;

pub use error::ExecError;
pub use executor::{CommandOutcome, Executor};
pub use pty::{PtySession, StreamOutcome};
pub use title::set_process_title;
pub use workdir::{is_package_scoped, working_dir_for};
