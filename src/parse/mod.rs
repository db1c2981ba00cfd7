//! The recursive-descent parser.
//!
//! Replaces the teacher's single-shot `repeat().fold()` driver
//! (`examples/zeenix-tomling/src/parse/mod.rs`) with a hand-rolled,
//! error-recovering driver: on a statement-level failure it records a
//! [`ParseError`] and skips to the next newline, so one document can
//! surface several diagnostics (spec.md §4.2/§7) instead of stopping at the
//! first.

pub(crate) mod builder;

use std::borrow::Cow;

use crate::{
    error::ParseError,
    lex::{Lexer, Token, TokenKind},
    table::TableState,
    version::TomlVersion,
    Array, Position, Table, Value,
};
use builder::{assign_dotted, TreeBuilder};

/// The outcome of parsing a document: a (possibly partial) tree plus any
/// diagnostics collected along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<'a> {
    root: Table<'a>,
    errors: Vec<ParseError>,
}

impl<'a> ParseResult<'a> {
    /// Whether any diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The diagnostics produced, in the order they were detected.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The (possibly partial) document tree.
    pub fn root(&self) -> &Table<'a> {
        &self.root
    }

    /// Consume the result, keeping only the tree.
    pub fn into_root(self) -> Table<'a> {
        self.root
    }

    /// Serialize the tree to canonical TOML.
    pub fn to_toml(&self) -> String {
        crate::ser::toml::to_toml(&self.root)
    }

    /// Serialize the tree to 2-space-indented JSON.
    pub fn to_json(&self) -> String {
        crate::ser::json::to_json(&self.root)
    }
}

/// Parse a TOML document under the default language version (1.0.0).
pub fn parse(input: &str) -> ParseResult<'_> {
    parse_with_version(input, TomlVersion::default())
}

/// Parse a TOML document under an explicit language version.
pub fn parse_with_version(input: &str, version: TomlVersion) -> ParseResult<'_> {
    Parser::new(input, version).run()
}

/// Nested arrays/inline-tables deeper than this are rejected with a lex
/// error rather than risking a stack overflow in `parse_value_token`'s
/// recursion (spec.md §5 permits, without mandating, a recursion-depth
/// resource-exhaustion guard; the teacher's own `issue_8` regression test
/// exists because a pathologically nested unterminated array used to hang).
const MAX_NESTING_DEPTH: usize = 128;

struct Parser<'a> {
    lexer: Lexer<'a>,
    builder: TreeBuilder<'a>,
    errors: Vec<ParseError>,
    version: TomlVersion,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, version: TomlVersion) -> Self {
        Self {
            lexer: Lexer::new(input, version),
            builder: TreeBuilder::new(),
            errors: Vec::new(),
            version,
            depth: 0,
        }
    }

    fn run(mut self) -> ParseResult<'a> {
        loop {
            let token = self.lexer.expect_key();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => continue,
                TokenKind::LBracket => self.parse_table_header(token.position, false),
                TokenKind::DblLBracket => self.parse_table_header(token.position, true),
                TokenKind::Invalid(msg) => {
                    self.error(token.position, msg);
                    self.recover();
                }
                _ => self.parse_assignment(token),
            }
        }
        ParseResult {
            root: self.builder.into_root(),
            errors: self.errors,
        }
    }

    fn error(&mut self, position: Position, message: impl Into<String>) {
        self.errors.push(ParseError::new(position, message));
    }

    fn recover(&mut self) {
        self.lexer.recover_to_next_line();
    }

    fn parse_table_header(&mut self, pos: Position, is_array: bool) {
        let path = match self.parse_dotted_key_segments() {
            Ok(path) => path,
            Err(e) => {
                self.errors.push(e);
                self.recover();
                return;
            }
        };

        let expected_close = if is_array {
            TokenKind::DblRBracket
        } else {
            TokenKind::RBracket
        };
        let close = self.lexer.expect_table_header();
        if close.kind != expected_close {
            let label = if is_array { "]]" } else { "]" };
            self.error(
                close.position,
                format!("Unexpected {}, expected {label}", describe_token(&close.kind)),
            );
            self.recover();
            return;
        }

        let after = self.lexer.expect_key();
        match after.kind {
            TokenKind::Newline | TokenKind::Eof => {}
            other => {
                self.error(
                    after.position,
                    format!(
                        "Unexpected {}, expected a newline or end-of-input",
                        describe_token(&other)
                    ),
                );
                self.recover();
                return;
            }
        }

        let result = if is_array {
            self.builder.define_array_table(&path, pos)
        } else {
            self.builder.define_table(&path, pos)
        };
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    fn parse_assignment(&mut self, first: Token<'a>) {
        let path = match self.parse_dotted_key_segments_from(first) {
            Ok(path) => path,
            Err(e) => {
                self.errors.push(e);
                self.recover();
                return;
            }
        };

        let eq = self.lexer.expect_key();
        if !matches!(eq.kind, TokenKind::Equals) {
            self.error(
                eq.position,
                format!("Unexpected {}, expected '='", describe_token(&eq.kind)),
            );
            self.recover();
            return;
        }

        let value_tok = self.lexer.expect_value();
        let value_pos = value_tok.position;
        let value = match self.parse_value_token(value_tok) {
            Ok(v) => v,
            Err(e) => {
                self.errors.push(e);
                self.recover();
                return;
            }
        };

        let after = self.lexer.expect_key();
        match after.kind {
            TokenKind::Newline | TokenKind::Eof => {}
            other => {
                self.error(
                    after.position,
                    format!(
                        "Unexpected {}, expected a newline or end-of-input",
                        describe_token(&other)
                    ),
                );
                self.recover();
                return;
            }
        }

        if let Err(e) = self.builder.set_value(&path, value, value_pos) {
            self.errors.push(e);
        }
    }

    /// `key ('.' key)*`, starting from an already-read first token.
    fn parse_dotted_key_segments_from(
        &mut self,
        first: Token<'a>,
    ) -> Result<Vec<Cow<'a, str>>, ParseError> {
        let mut segments = vec![self.key_token_to_segment(first)?];
        loop {
            if !matches!(self.lexer.peek_key().kind, TokenKind::Dot) {
                break;
            }
            let dot_pos = self.lexer.expect_key().position;
            if !self.version.supports_dotted_keys() {
                return Err(ParseError::new(dot_pos, "Dotted keys are not supported"));
            }
            let tok = self.lexer.expect_key();
            segments.push(self.key_token_to_segment(tok)?);
        }
        Ok(segments)
    }

    fn parse_dotted_key_segments(&mut self) -> Result<Vec<Cow<'a, str>>, ParseError> {
        let first = self.lexer.expect_key();
        self.parse_dotted_key_segments_from(first)
    }

    fn key_token_to_segment(&self, tok: Token<'a>) -> Result<Cow<'a, str>, ParseError> {
        match tok.kind {
            TokenKind::Bare(s) => Ok(Cow::Borrowed(s)),
            TokenKind::Str(s) => Ok(s),
            TokenKind::Invalid(msg) => Err(ParseError::new(tok.position, msg)),
            other => Err(ParseError::new(
                tok.position,
                format!("Unexpected {}, expected a key", describe_token(&other)),
            )),
        }
    }

    fn parse_value_token(&mut self, tok: Token<'a>) -> Result<Value<'a>, ParseError> {
        match tok.kind {
            TokenKind::Str(s) => Ok(Value::String(s)),
            TokenKind::Integer(i) => Ok(Value::Integer(i)),
            TokenKind::Float(f) => Ok(Value::Float(f)),
            TokenKind::Boolean(b) => Ok(Value::Boolean(b)),
            TokenKind::Datetime(v) => Ok(v),
            TokenKind::LBracket => self.parse_nested(tok.position, Self::parse_array),
            TokenKind::LBrace => self.parse_nested(tok.position, Self::parse_inline_table),
            TokenKind::Invalid(msg) => Err(ParseError::new(tok.position, msg)),
            other => Err(ParseError::new(
                tok.position,
                format!("Unexpected {}, expected a value", describe_token(&other)),
            )),
        }
    }

    fn parse_nested(
        &mut self,
        position: Position,
        inner: fn(&mut Self) -> Result<Value<'a>, ParseError>,
    ) -> Result<Value<'a>, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new(position, "Nesting is too deep"));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    fn parse_array(&mut self) -> Result<Value<'a>, ParseError> {
        let mut arr = Array::new();
        let mut first_kind: Option<&'static str> = None;
        loop {
            let tok = self.lexer.expect_value();
            match tok.kind {
                TokenKind::RBracket => break,
                TokenKind::Comma => continue,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        tok.position,
                        "Unexpected end-of-input, expected a value or ']'",
                    ))
                }
                _ => {
                    let pos = tok.position;
                    let value = self.parse_value_token(tok)?;
                    if !self.version.supports_heterogeneous_arrays() {
                        let kind = value.kind_name();
                        match first_kind {
                            None => first_kind = Some(kind),
                            Some(k) if k != kind => {
                                return Err(ParseError::new(
                                    pos,
                                    format!("Cannot add a {kind} to an array containing {k}s"),
                                ));
                            }
                            _ => {}
                        }
                    }
                    arr.push(value);

                    let sep = self.lexer.expect_value();
                    match sep.kind {
                        TokenKind::Comma => continue,
                        TokenKind::RBracket => break,
                        TokenKind::Eof => {
                            return Err(ParseError::new(
                                sep.position,
                                "Unexpected end-of-input, expected ',' or ']'",
                            ))
                        }
                        other => {
                            return Err(ParseError::new(
                                sep.position,
                                format!("Unexpected {}, expected ',' or ']'", describe_token(&other)),
                            ))
                        }
                    }
                }
            }
        }
        Ok(Value::Array(arr))
    }

    fn parse_inline_table(&mut self) -> Result<Value<'a>, ParseError> {
        let mut table = Table::with_state(TableState::InlineLiteral, Position::start());

        let first = self.lexer.expect_inline();
        if matches!(first.kind, TokenKind::RBrace) {
            return Ok(Value::Table(table));
        }

        let mut tok = first;
        loop {
            let segments = self.parse_dotted_key_segments_from(tok)?;

            let eq = self.lexer.expect_inline();
            if !matches!(eq.kind, TokenKind::Equals) {
                return Err(ParseError::new(
                    eq.position,
                    format!("Unexpected {}, expected '='", describe_token(&eq.kind)),
                ));
            }

            let value_tok = self.lexer.expect_inline();
            let pos = value_tok.position;
            let value = self.parse_value_token(value_tok)?;
            assign_dotted(&mut table, &segments, value, pos, TableState::DottedIntermediate)?;

            let sep = self.lexer.expect_inline();
            match sep.kind {
                TokenKind::RBrace => break,
                TokenKind::Comma => {
                    tok = self.lexer.expect_inline();
                }
                TokenKind::Newline => {
                    return Err(ParseError::new(
                        sep.position,
                        "Unexpected newline, expected ',' or '}'",
                    ))
                }
                other => {
                    return Err(ParseError::new(
                        sep.position,
                        format!("Unexpected {}, expected ',' or '}}'", describe_token(&other)),
                    ))
                }
            }
        }
        Ok(Value::Table(table))
    }

}

/// Canonical rendering of a token kind for "Unexpected …" diagnostics.
fn describe_token(kind: &TokenKind<'_>) -> String {
    match kind {
        TokenKind::Eof => "end-of-input".to_string(),
        TokenKind::Newline => "a newline".to_string(),
        TokenKind::Equals => "'='".to_string(),
        TokenKind::Dot => "'.'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::DblLBracket => "'[['".to_string(),
        TokenKind::DblRBracket => "']]'".to_string(),
        TokenKind::LBrace => "'{'".to_string(),
        TokenKind::RBrace => "'}'".to_string(),
        TokenKind::Bare(s) => format!("'{s}'"),
        TokenKind::Str(s) => format!("'{s}'"),
        TokenKind::Integer(i) => format!("'{i}'"),
        TokenKind::Float(f) => format!("'{f}'"),
        TokenKind::Boolean(b) => format!("'{b}'"),
        TokenKind::Datetime(v) => format!("'{v:?}'"),
        TokenKind::Invalid(msg) => msg.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_key_value() {
        let r = parse("foo = 1\nbar = \"baz\"\n");
        assert!(!r.has_errors());
        assert_eq!(r.root().get("foo").and_then(Value::as_integer), Some(1));
        assert_eq!(r.root().get("bar").and_then(Value::as_str), Some("baz"));
    }

    // Regression coverage for the teacher's issue_8 (a deeply nested
    // unterminated array used to hang); this crate instead fails fast with
    // a bounded-nesting error.
    #[test]
    fn deeply_nested_array_is_rejected_not_stack_overflowed() {
        let opens = "[".repeat(200);
        let r = parse(&format!("a = {opens}"));
        assert!(r.has_errors());
        assert_eq!(r.errors()[0].message(), "Nesting is too deep");
    }

    #[test]
    fn moderately_nested_array_still_parses() {
        let input = format!("a = {}1{}", "[".repeat(10), "]".repeat(10));
        let r = parse(&input);
        assert!(!r.has_errors());
    }

    #[test]
    fn dotted_key_then_header_conflict() {
        let r = parse("[fruit]\napple.color = \"red\"\napple.taste.sweet = true\n\n[fruit.apple]");
        assert_eq!(r.errors().len(), 1);
        assert_eq!(
            r.errors()[0].message(),
            "fruit.apple previously defined at line 2, column 1"
        );
        assert_eq!(r.errors()[0].position(), Position { line: 5, column: 1 });
    }

    #[test]
    fn duplicate_key_errors() {
        let r = parse("foo = 1\nfoo = 2\n");
        assert_eq!(r.errors().len(), 1);
        assert_eq!(
            r.errors()[0].message(),
            "foo previously defined at line 1, column 1"
        );
        assert_eq!(r.errors()[0].position(), Position { line: 2, column: 1 });
    }

    #[test]
    fn literal_array_then_array_table_header_conflict() {
        let r = parse("foo = [1]\n[[foo]]\nbar=2\n");
        assert_eq!(r.errors().len(), 1);
        assert_eq!(
            r.errors()[0].message(),
            "foo previously defined as a literal array at line 1, column 1"
        );
        assert_eq!(r.errors()[0].position(), Position { line: 2, column: 1 });
    }

    #[test]
    fn heterogeneous_array_rejected_below_v1() {
        let r = parse_with_version("foo = [ 1, 'bar' ]", TomlVersion::V0_5_0);
        assert_eq!(r.errors().len(), 1);
        assert_eq!(
            r.errors()[0].message(),
            "Cannot add a string to an array containing integers"
        );
        assert_eq!(r.errors()[0].position(), Position { line: 1, column: 12 });
    }

    #[test]
    fn multiline_basic_strips_leading_newline() {
        let r = parse("foo = \"\"\"\n  foobar\"\"\"");
        assert!(!r.has_errors());
        assert_eq!(r.root().get("foo").and_then(Value::as_str), Some("  foobar"));
    }

    #[test]
    fn dotted_keys_rejected_in_v0_4_0() {
        let r = parse_with_version("a.b = 1\n", TomlVersion::V0_4_0);
        assert_eq!(r.errors().len(), 1);
        assert_eq!(r.errors()[0].message(), "Dotted keys are not supported");
    }

    #[test]
    fn array_table_and_inline_table() {
        let r = parse("[[points]]\nx = 1\ny = { a = 1, b = 2 }\n[[points]]\nx = 2\n");
        assert!(!r.has_errors());
        let points = r.root().get_array("points").unwrap().unwrap();
        assert_eq!(points.len(), 2);
        let first = points.get(0).unwrap().as_table().unwrap();
        assert_eq!(first.get("x").and_then(Value::as_integer), Some(1));
        let y = first.get("y").unwrap().as_table().unwrap();
        assert_eq!(y.get("a").and_then(Value::as_integer), Some(1));
    }
}
