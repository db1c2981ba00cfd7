//! A TOML document parser.
//!
//! Parses a complete document into a positioned error list plus a typed
//! value tree, rather than failing at the first malformed line: [`parse`]
//! (and the version-configurable [`parse_with_version`]) always return a
//! [`parse::ParseResult`], whose [`parse::ParseResult::has_errors`] and
//! [`parse::ParseResult::errors`] report what went wrong while
//! [`parse::ParseResult::root`] still exposes everything that parsed
//! successfully around it.
//!
//! ```
//! let result = tomling::parse("name = \"example\"\nversion = 1\n");
//! assert!(!result.has_errors());
//! assert_eq!(result.root().get_string("name").unwrap(), Some("example"));
//! ```

#![forbid(unsafe_code)]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub)]

mod array;
mod datetime;
mod error;
mod key;
mod lex;
mod parse;
mod position;
mod ser;
mod table;
mod value;
mod version;

pub use array::{Array, ArrayKind};
pub use datetime::{Date, LocalDate, LocalDateTime, LocalTime, Offset, OffsetDateTime, Time};
pub use error::{Error, ParseError};
pub use key::{KeyError, KeySegment};
pub use parse::{parse, parse_with_version, ParseResult};
pub use position::Position;
pub use table::{Iter, Table};
pub use value::{equals, Value};
pub use version::TomlVersion;

/// Split a dotted-key lookup path into its segments.
///
/// Thin wrapper around [`key::split_key`], exposed at the crate root so
/// callers building their own path-based lookups don't need to reach into
/// the `key` module directly.
pub fn parse_key(path: &str) -> Result<Vec<KeySegment>, KeyError> {
    key::split_key(path)
}
