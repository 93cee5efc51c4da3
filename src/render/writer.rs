//! Line-oriented source buffer for generated code
//!
//! Backends only ever produce whole lines, so the buffer has no notion of a
//! partial line: every [`line`](IndentWriter::line) is indented at the
//! current depth and terminated.

/// Indentation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentStyle {
    /// Spaces per level; ignored with `tabs`
    pub size: usize,
    pub tabs: bool,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self {
            size: 4,
            tabs: false,
        }
    }
}

impl IndentStyle {
    fn prefix(&self, depth: usize) -> String {
        if self.tabs {
            "\t".repeat(depth)
        } else {
            " ".repeat(depth * self.size)
        }
    }
}

#[derive(Debug, Default)]
pub struct IndentWriter {
    output: String,
    depth: usize,
    style: IndentStyle,
}

impl IndentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: IndentStyle) -> Self {
        Self {
            output: String::new(),
            depth: 0,
            style,
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append `text` at the current depth. Embedded newlines start further
    /// lines at the same depth; empty lines get no trailing whitespace.
    pub fn line(&mut self, text: &str) {
        let prefix = self.style.prefix(self.depth);
        for part in text.split('\n') {
            if !part.is_empty() {
                self.output.push_str(&prefix);
                self.output.push_str(part);
            }
            self.output.push('\n');
        }
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// `open`, then `body` one level deeper, then `close` back at this depth.
    ///
    /// `close` is `None` for blocks ended by the next label, such as C `case`
    /// arms.
    pub fn block<F>(&mut self, open: &str, close: Option<&str>, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.line(open);
        self.indent();
        body(self);
        self.dedent();
        if let Some(close) = close {
            self.line(close);
        }
    }
}
