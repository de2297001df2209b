// reporter.rs — Reporter trait and its console, log and fan-out variants.
//
// Output routing is pluggable via the `Reporter` trait. The console variant
// colors labels and status lines; the log variant writes the same messages
// without color to the replay log; the fan-out variant forwards to several.
// Components never print directly; they are handed an `Arc<dyn Reporter>`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use regex::Regex;

use crate::error::OutputError;
use crate::label::Label;
use crate::style::{Tone, HEADER, RESET};

/// Matches CSI sequences (colors, cursor movement) and OSC sequences
/// (terminal titles) so they can be dropped from the replay log.
const ANSI_PATTERN: &str = r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(\x07|\x1b\\)";

/// Capability for emitting user-facing messages.
pub trait Reporter: Send + Sync {
    /// Emit one message, optionally prefixed by a command label.
    fn emit(&self, tone: Tone, label: Option<&Label>, message: &str);

    /// Set the terminal title. Ignored by reporters without a terminal.
    fn title(&self, _title: &str) {}

    /// Push any buffered output to its destination.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn say(&self, message: &str) {
        self.emit(Tone::Plain, None, message);
    }

    fn header(&self, message: &str) {
        self.emit(Tone::Header, None, message);
    }

    fn success(&self, message: &str) {
        self.emit(Tone::Success, None, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Tone::Warning, None, message);
    }

    fn error(&self, message: &str) {
        self.emit(Tone::Error, None, message);
    }

    /// Emit a message in a command's label column.
    fn labeled(&self, label: &Label, tone: Tone, message: &str) {
        self.emit(tone, Some(label), message);
    }
}

// ── Console ─────────────────────────────────────────────────────

/// Writes to stdout (errors to stderr), with optional ANSI color.
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Format a message the way it appears on the terminal.
    pub fn render(&self, tone: Tone, label: Option<&Label>, message: &str) -> String {
        let prefix = match label {
            Some(label) => label.color().paint(&label.padded(), self.color),
            None => String::new(),
        };
        let body = match (tone, tone.color()) {
            (Tone::Header, _) if self.color => format!("{HEADER}{message}{RESET}"),
            (_, Some(color)) => color.paint(message, self.color),
            (_, None) => message.to_string(),
        };
        format!("{prefix}{body}")
    }
}

impl Reporter for ConsoleReporter {
    fn emit(&self, tone: Tone, label: Option<&Label>, message: &str) {
        let line = self.render(tone, label, message);
        // A closed stdout/stderr (e.g. `sieve test | head`) must not take the run down.
        let _ = if tone == Tone::Error {
            writeln!(io::stderr().lock(), "{line}")
        } else {
            writeln!(io::stdout().lock(), "{line}")
        };
    }

    fn title(&self, title: &str) {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            return;
        }
        let mut out = stdout.lock();
        let _ = write!(out, "\x1b]0;{title}\x07");
        let _ = out.flush();
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()?;
        io::stderr().flush()
    }
}

// ── Replay log ──────────────────────────────────────────────────

/// Appends every message, uncolored and timestamped, to a plain-text file.
///
/// Each line is flushed as it is written so the log stays complete even if
/// the run is cut short.
pub struct LogReporter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    ansi: Regex,
}

impl LogReporter {
    /// Create (or truncate) the replay log at `path`, creating parent dirs.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| OutputError::OpenFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| OutputError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
            ansi: Regex::new(ANSI_PATTERN)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove terminal escape sequences from `text`.
    pub fn strip_ansi(&self, text: &str) -> String {
        self.ansi.replace_all(text, "").into_owned()
    }

    fn writer(&self) -> MutexGuard<'_, BufWriter<File>> {
        // A poisoned lock only means another thread panicked mid-write; the
        // file itself is still usable.
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for LogReporter {
    fn emit(&self, tone: Tone, label: Option<&Label>, message: &str) {
        let prefix = label.map(Label::padded).unwrap_or_default();
        let line = format!(
            "[{}] {}: {}{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            tone.level(),
            prefix,
            self.strip_ansi(message)
        );
        let mut writer = self.writer();
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            tracing::warn!(path = %self.path.display(), error = %e, "replay log write failed");
        }
    }

    fn flush(&self) -> io::Result<()> {
        self.writer().flush()
    }
}

// ── Fan-out ─────────────────────────────────────────────────────

/// Forwards every call to each wrapped reporter, in order.
#[derive(Default)]
pub struct FanoutReporter {
    reporters: Vec<Arc<dyn Reporter>>,
}

impl FanoutReporter {
    pub fn new(reporters: Vec<Arc<dyn Reporter>>) -> Self {
        Self { reporters }
    }

    pub fn push(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporters.push(reporter);
    }
}

impl Reporter for FanoutReporter {
    fn emit(&self, tone: Tone, label: Option<&Label>, message: &str) {
        for reporter in &self.reporters {
            reporter.emit(tone, label, message);
        }
    }

    fn title(&self, title: &str) {
        for reporter in &self.reporters {
            reporter.title(title);
        }
    }

    fn flush(&self) -> io::Result<()> {
        let mut first_err = None;
        for reporter in &self.reporters {
            if let Err(e) = reporter.flush() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

// ── In-memory ───────────────────────────────────────────────────

/// One message captured by a [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tone: Tone,
    pub label: Option<String>,
    pub message: String,
}

/// Keeps every message in memory. Used by embedders and tests that need
/// to inspect what a run printed.
#[derive(Default)]
pub struct MemoryReporter {
    records: Mutex<Vec<Record>>,
    titles: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages emitted under `label`, in order.
    pub fn lines_for(&self, label: &str) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.label.as_deref() == Some(label))
            .map(|r| r.message)
            .collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|r| r.message.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn emit(&self, tone: Tone, label: Option<&Label>, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Record {
                tone,
                label: label.map(|l| l.as_str().to_string()),
                message: message.to_string(),
            });
    }

    fn title(&self, title: &str) {
        self.titles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(title.to_string());
    }
}
