//! # sieve-output
//!
//! Everything sieve prints goes through a [`Reporter`].
//!
//! A run normally uses a [`FanoutReporter`] over two variants: a
//! [`ConsoleReporter`] that colors labels and status lines for the terminal,
//! and a [`LogReporter`] that appends the same messages, stripped of ANSI
//! escapes and timestamped, to the replay log. Command output lines are
//! prefixed with a fixed-width [`Label`] and passed through a [`Redactor`]
//! so sandbox paths read as the user's own files.

pub mod error;
pub mod label;
pub mod redact;
pub mod reporter;
pub mod style;

pub use error::OutputError;
pub use label::{Label, LABEL_WIDTH};
pub use redact::Redactor;
pub use reporter::{
    ConsoleReporter, FanoutReporter, LogReporter, MemoryReporter, Record, Reporter,
};
pub use style::{Color, Tone};
