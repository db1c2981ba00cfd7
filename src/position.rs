//! Source positions.

use core::fmt;

/// A 1-indexed (line, column) pair into the original source text.
///
/// Columns count `char`s, not bytes, so a supplementary-plane code point
/// still advances the column by exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
}

impl Position {
    /// The position of the first character of the document.
    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    pub(crate) fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
