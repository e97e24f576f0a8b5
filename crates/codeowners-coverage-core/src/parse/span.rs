//! Source locations for CODEOWNERS parsing.
//!
//! Every AST node and parse error carries a [`Span`] so problems can be
//! reported as `line:column` against the rules file.

use serde::Serialize;
use std::fmt;

/// A location span in the rules file.
///
/// Line and column are 1-based for human-readable messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Byte offset from the start of the input (0-based).
    pub offset: usize,
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based).
    pub column: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Span {
    /// Creates a new span with the given position and length.
    pub fn new(offset: usize, line: usize, column: usize, length: usize) -> Self {
        Self {
            offset,
            line,
            column,
            length,
        }
    }

    /// Creates a span for a slice of a line.
    ///
    /// `line_offset` is the byte offset of the line start in the whole input,
    /// `within` is the byte offset of the slice inside the line.
    pub fn in_line(line_offset: usize, line: usize, within: usize, length: usize) -> Self {
        Self::new(line_offset + within, line, within + 1, length)
    }

    /// Returns the end offset of this span.
    pub fn end_offset(&self) -> usize {
        self.offset + self.length
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(0, 1, 1, 0)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
