// label.rs — Fixed-width, colored command labels.
//
// Every line a command produces is prefixed with its label, truncated or
// padded to LABEL_WIDTH and followed by " | ". The color is picked from a
// small palette by the label's length, so a label keeps its color across
// runs.

use crate::style::Color;

/// Width of the label column.
pub const LABEL_WIDTH: usize = 20;

const PALETTE: [Color; 4] = [Color::Yellow, Color::Blue, Color::Magenta, Color::Cyan];

const SEPARATOR: &str = " | ";

/// A command label as shown in the output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Palette color chosen by label length.
    pub fn color(&self) -> Color {
        PALETTE[self.text.chars().count() % PALETTE.len()]
    }

    /// The label column: truncated/padded to [`LABEL_WIDTH`], plus separator.
    pub fn padded(&self) -> String {
        let truncated: String = self.text.chars().take(LABEL_WIDTH).collect();
        format!("{:<width$}{}", truncated, SEPARATOR, width = LABEL_WIDTH)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
