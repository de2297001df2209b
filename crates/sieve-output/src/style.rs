// style.rs — ANSI colors and message tones.

/// Foreground colors used by the console reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Magenta => "\x1b[35m",
            Color::Cyan => "\x1b[36m",
        }
    }

    /// Wrap `text` in this color, or return it unchanged when disabled.
    pub fn paint(self, text: &str, enabled: bool) -> String {
        if enabled {
            format!("{}{}{}", self.code(), text, RESET)
        } else {
            text.to_string()
        }
    }
}

pub(crate) const RESET: &str = "\x1b[0m";

/// Black on white, used for package headers.
pub(crate) const HEADER: &str = "\x1b[30m\x1b[47m";

/// The kind of message being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Header,
    Success,
    Warning,
    Error,
}

impl Tone {
    /// Color applied to the message body, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Tone::Plain | Tone::Header => None,
            Tone::Success => Some(Color::Green),
            Tone::Warning => Some(Color::Yellow),
            Tone::Error => Some(Color::Red),
        }
    }

    /// Severity name written to the replay log.
    pub fn level(self) -> &'static str {
        match self {
            Tone::Plain | Tone::Header | Tone::Success => "INFO",
            Tone::Warning => "WARN",
            Tone::Error => "ERROR",
        }
    }
}
