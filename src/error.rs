//! Error types.
//!
//! The teacher crate's `error.rs` wraps a single `winnow::error::ContextError`
//! behind a hand-written `Display` impl with no `thiserror`; this module
//! keeps that posture; it just carries a [`Position`] and supports being
//! collected into a list instead of short-circuiting the first failure.

use std::fmt;

use crate::{key::KeyError, Position};

/// A single positioned diagnostic produced while lexing or parsing a
/// document.
///
/// Renders via `Display` as `"line L, column C: <message>"`, per the result
/// record's `Error` contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub(crate) position: Position,
    pub(crate) message: String,
}

impl ParseError {
    pub(crate) fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// The position at which this error was detected.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The human-readable message, without the position prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The error type for operations other than collecting document parse
/// diagnostics: typed-accessor type mismatches and invalid constructed
/// date/time values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A typed accessor (e.g. `get_string`) found a value at the requested
    /// path, but it was not of the requested type.
    Convert {
        /// The TOML kind the value actually has.
        from: &'static str,
        /// The TOML kind the caller requested.
        to: &'static str,
    },
    /// A caller-supplied dotted-key lookup path failed the key
    /// micro-grammar.
    InvalidKey(KeyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Convert { from, to } => write!(f, "cannot convert {from} to {to}"),
            Error::InvalidKey(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidKey(e) => Some(e),
            _ => None,
        }
    }
}

/// Canonical rendering of a character for "Unexpected '…'" diagnostics:
/// printable characters render literally, others render as `\uXXXX` (BMP) or
/// `\UXXXXXXXX` (astral), per spec.md §4.2.
pub(crate) fn render_char(c: char) -> String {
    if c.is_ascii_graphic() || c == ' ' {
        c.to_string()
    } else if (c as u32) > 0xFFFF {
        format!("\\U{:08X}", c as u32)
    } else {
        format!("\\u{:04X}", c as u32)
    }
}
