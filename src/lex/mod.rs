//! The hand-rolled cursor lexer.
//!
//! Structural tokens, bare/quoted keys, and strings (with escape decoding
//! and position tracking) are scanned directly over a [`Cursor`], in the
//! manner of the cursor-based lexers seen elsewhere in the retrieved pack
//! (`zParse`'s `TomlLexer`). Numeric and date/time literals instead run the
//! teacher's existing `winnow` leaf grammars (`lex::number`, `lex::datetime`)
//! directly against the cursor's remaining input, replaying whatever they
//! consume through [`Cursor::advance_by`] so the cursor's own line/column
//! tracking stays authoritative — `winnow`'s `&str` stream has no notion of
//! position.
//!
//! The [`Mode`] the parser requests narrows what a token may mean at a
//! given grammar position (`1937-07-18` is a date in [`Mode::Value`] but a
//! bare key in [`Mode::Key`]), per the Design Notes' explicit lexer mode
//! enum requirement.

pub(crate) mod datetime;
pub(crate) mod number;

use std::borrow::Cow;

use winnow::{combinator::alt, Parser};

use crate::{error::render_char, version::TomlVersion, Position, Value};

/// Which grammar position the parser is asking the lexer to recognize a
/// token for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// A key segment, or one of the structural tokens that can follow it
    /// (`.`, `=`, `]`, `]]`).
    Key,
    /// A value position: string, number, boolean, datetime, or the opening
    /// delimiter of an array/inline table.
    Value,
    /// The inside of `[ … ]` / `[[ … ]]` on a table-header line.
    TableHeader,
    /// The inside of a `{ … }` inline-table literal: value recognition
    /// (including structural `{`/`}`/`,`/`=`) applies, but unlike
    /// [`Mode::Value`] a bare newline is significant (and thus always an
    /// error) — TOML inline tables cannot span lines.
    InlineTable,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind<'a> {
    LBracket,
    RBracket,
    DblLBracket,
    DblRBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Equals,
    Newline,
    Eof,
    Bare(&'a str),
    Str(Cow<'a, str>),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Value<'static>),
    /// A lex-level failure; carries the already-formatted diagnostic
    /// message (position is on the enclosing [`Token`]).
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    pub(crate) position: Position,
}

/// A cursor over the source text: tracks both a byte-indexed remaining
/// slice (for `winnow` sub-parsers) and a 1-indexed (line, column)
/// [`Position`] that advances per `char`, not per byte, so astral-plane
/// code points count as a single column.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    rest: &'a str,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            position: Position::start(),
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.rest
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    pub(crate) fn peek_at(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    pub(crate) fn starts_with(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        self.position.advance(c);
        Some(c)
    }

    /// Advance past `consumed`, a prefix of `self.rest()` produced by a
    /// `winnow` sub-parser run against a copy of it.
    pub(crate) fn advance_by(&mut self, consumed: &str) {
        for c in consumed.chars() {
            self.position.advance(c);
        }
        self.rest = &self.rest[consumed.len()..];
    }

    pub(crate) fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
    }

    /// Skip spaces and comments; if `newlines`, also blank lines. A stray
    /// `\r` not immediately followed by `\n` is left in place, for the
    /// caller to reject (spec.md §4.1: `"Unexpected '\r'…"`).
    pub(crate) fn skip_trivia(&mut self, newlines: bool) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') => {
                    self.bump();
                }
                Some('\n') if newlines => {
                    self.bump();
                }
                Some('\r') if newlines && self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                Some('#') => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }
}

pub(crate) fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// The streaming tokenizer. Holds only a [`Cursor`] and the configured
/// [`TomlVersion`] (which gates the raw-tab-in-string rule).
#[derive(Debug, Clone)]
pub(crate) struct Lexer<'a> {
    cursor: Cursor<'a>,
    version: TomlVersion,
    lookahead: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str, version: TomlVersion) -> Self {
        Self {
            cursor: Cursor::new(input),
            version,
            lookahead: None,
        }
    }

    pub(crate) fn position(&self) -> Position {
        match &self.lookahead {
            Some(t) => t.position,
            None => self.cursor.position(),
        }
    }

    /// Request a token appropriate to a key position.
    pub(crate) fn expect_key(&mut self) -> Token<'a> {
        self.take(Mode::Key)
    }

    /// Request a token appropriate to a value position.
    pub(crate) fn expect_value(&mut self) -> Token<'a> {
        self.take(Mode::Value)
    }

    /// Request a token appropriate to the inside of a table-header's
    /// brackets (keys and `.`, same as [`Mode::Key`], kept as a distinct
    /// call site for the two grammar productions that use it).
    pub(crate) fn expect_table_header(&mut self) -> Token<'a> {
        self.take(Mode::TableHeader)
    }

    /// Request a token appropriate to the inside of a `{ … }` literal.
    pub(crate) fn expect_inline(&mut self) -> Token<'a> {
        self.take(Mode::InlineTable)
    }

    /// Look at (without consuming) the next key-position token.
    pub(crate) fn peek_key(&mut self) -> &Token<'a> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.next_token(Mode::Key));
        }
        self.lookahead.as_ref().expect("just populated")
    }

    fn take(&mut self, mode: Mode) -> Token<'a> {
        if let Some(t) = self.lookahead.take() {
            return t;
        }
        self.next_token(mode)
    }

    /// Skip to just past the next newline (or to end-of-input), for
    /// statement-level error recovery. Returns the position it started at.
    pub(crate) fn recover_to_next_line(&mut self) -> Position {
        self.lookahead = None;
        let start = self.cursor.position();
        loop {
            match self.cursor.peek() {
                None => break,
                Some('\n') => {
                    self.cursor.bump();
                    break;
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        start
    }

    fn next_token(&mut self, mode: Mode) -> Token<'a> {
        let newlines_significant = !matches!(mode, Mode::Value);
        let accepts_value_tokens = matches!(mode, Mode::Value | Mode::InlineTable);
        self.cursor.skip_trivia(!newlines_significant);

        let position = self.cursor.position();
        let kind = match self.cursor.peek() {
            None => TokenKind::Eof,
            Some('\r') if self.cursor.peek_at(1) != Some('\n') => {
                self.cursor.bump();
                TokenKind::Invalid("Unexpected '\\r'".to_string())
            }
            Some('\r') => {
                self.cursor.bump();
                self.cursor.bump();
                TokenKind::Newline
            }
            Some('\n') => {
                self.cursor.bump();
                TokenKind::Newline
            }
            Some('=') => {
                self.cursor.bump();
                TokenKind::Equals
            }
            Some('.') => {
                self.cursor.bump();
                TokenKind::Dot
            }
            Some(',') => {
                self.cursor.bump();
                TokenKind::Comma
            }
            Some('[') => {
                self.cursor.bump();
                if self.cursor.peek() == Some('[') {
                    self.cursor.bump();
                    TokenKind::DblLBracket
                } else {
                    TokenKind::LBracket
                }
            }
            Some(']') => {
                self.cursor.bump();
                if self.cursor.peek() == Some(']') {
                    self.cursor.bump();
                    TokenKind::DblRBracket
                } else {
                    TokenKind::RBracket
                }
            }
            Some('{') if accepts_value_tokens => {
                self.cursor.bump();
                TokenKind::LBrace
            }
            Some('}') if accepts_value_tokens => {
                self.cursor.bump();
                TokenKind::RBrace
            }
            Some('"') => self.scan_basic_or_multiline(),
            Some('\'') => self.scan_literal_or_multiline(),
            Some(c) if accepts_value_tokens => self.scan_value_scalar(c),
            Some(c) if is_bare_key_char(c) => self.scan_bare(),
            Some(c) => {
                self.cursor.bump();
                TokenKind::Invalid(format!("Unexpected '{}'", render_char(c)))
            }
        };

        Token { kind, position }
    }

    fn scan_bare(&mut self) -> TokenKind<'a> {
        let rest = self.cursor.rest();
        let end = rest
            .find(|c: char| !is_bare_key_char(c))
            .unwrap_or(rest.len());
        let text = &rest[..end];
        self.cursor.advance_by(text);
        TokenKind::Bare(text)
    }

    fn scan_value_scalar(&mut self, first: char) -> TokenKind<'a> {
        if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '_')) && !first.is_ascii_alphabetic() {
            self.cursor.bump();
            return TokenKind::Invalid(format!(
                "Unexpected '{}', expected a value",
                render_char(first)
            ));
        }

        enum Scalar<'i> {
            Datetime(datetime::RawComponents),
            Float(&'i str),
            Integer(number::IntegerLiteral<'i>),
            Boolean(bool),
        }

        let mut input = self.cursor.rest();
        let original = input;
        let result = alt((
            datetime::date_time.map(Scalar::Datetime),
            number::float.map(Scalar::Float),
            number::integer.map(Scalar::Integer),
            number::boolean.map(Scalar::Boolean),
        ))
        .parse_next(&mut input);

        match result {
            Ok(scalar) => {
                let consumed_len = original.len() - input.len();
                let consumed = &original[..consumed_len];
                self.cursor.advance_by(consumed);
                match scalar {
                    Scalar::Datetime(raw) => match datetime::classify(raw) {
                        Ok(value) => TokenKind::Datetime(value),
                        Err(msg) => TokenKind::Invalid(msg),
                    },
                    Scalar::Float(text) => match number::classify_float(text) {
                        Ok(f) => TokenKind::Float(f),
                        Err(msg) => TokenKind::Invalid(msg.to_string()),
                    },
                    Scalar::Integer(lit) => match number::classify_integer(lit) {
                        Ok(i) => TokenKind::Integer(i),
                        Err(msg) => TokenKind::Invalid(msg.to_string()),
                    },
                    Scalar::Boolean(b) => TokenKind::Boolean(b),
                }
            }
            Err(_) => {
                let end = original
                    .find(|c: char| c.is_whitespace() || matches!(c, ',' | ']' | '}' | '#'))
                    .unwrap_or(original.len());
                let text = &original[..end.max(1)];
                self.cursor.advance_by(text);
                TokenKind::Invalid(format!("Invalid number or date/time literal '{text}'"))
            }
        }
    }

    fn scan_basic_or_multiline(&mut self) -> TokenKind<'a> {
        if self.cursor.starts_with("\"\"\"") {
            self.scan_multiline_basic()
        } else {
            self.scan_basic()
        }
    }

    fn scan_literal_or_multiline(&mut self) -> TokenKind<'a> {
        if self.cursor.starts_with("'''") {
            self.scan_multiline_literal()
        } else {
            self.scan_literal()
        }
    }

    fn scan_basic(&mut self) -> TokenKind<'a> {
        self.cursor.bump(); // opening quote
        let mut out = String::new();
        let mut borrowed_ok = true;
        let start_rest = self.cursor.rest();
        loop {
            match self.cursor.peek() {
                None => return TokenKind::Invalid("Unexpected end-of-input in string".to_string()),
                Some('"') => {
                    self.cursor.bump();
                    break;
                }
                Some('\n') => {
                    return TokenKind::Invalid(
                        "Unexpected end-of-line in single-line string".to_string(),
                    )
                }
                Some('\\') => {
                    borrowed_ok = false;
                    match self.scan_escape() {
                        Ok(c) => out.push(c),
                        Err(msg) => return TokenKind::Invalid(msg),
                    }
                }
                Some('\t') if !self.version.allows_raw_tab_in_string() => {
                    return TokenKind::Invalid(
                        "Use \\t to represent a tab in a string (TOML versions before 1.0.0)"
                            .to_string(),
                    )
                }
                Some(c) => {
                    out.push(c);
                    self.cursor.bump();
                }
            }
        }
        if borrowed_ok {
            let consumed_len = start_rest.len() - self.cursor.rest().len() - 1;
            TokenKind::Str(Cow::Borrowed(&start_rest[..consumed_len]))
        } else {
            TokenKind::Str(Cow::Owned(out))
        }
    }

    fn scan_literal(&mut self) -> TokenKind<'a> {
        self.cursor.bump();
        let start_rest = self.cursor.rest();
        loop {
            match self.cursor.peek() {
                None => return TokenKind::Invalid("Unexpected end-of-input in string".to_string()),
                Some('\'') => break,
                Some('\n') => {
                    return TokenKind::Invalid(
                        "Unexpected end-of-line in single-line string".to_string(),
                    )
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        let len = start_rest.len() - self.cursor.rest().len();
        self.cursor.bump(); // closing quote
        TokenKind::Str(Cow::Borrowed(&start_rest[..len]))
    }

    /// Multiline basic strings close at the *last* occurring `"""` in the
    /// remaining input (spec.md §9 Open Question (a)): a leading-quote body
    /// like `""""This," she said…""""` lexes with `"This," she said…` as
    /// content, not a one-character body followed by a stray `"`.
    fn scan_multiline_basic(&mut self) -> TokenKind<'a> {
        self.cursor.bump();
        self.cursor.bump();
        self.cursor.bump();
        if self.cursor.peek() == Some('\n') {
            self.cursor.bump();
        } else if self.cursor.starts_with("\r\n") {
            self.cursor.bump();
            self.cursor.bump();
        }

        let body_start = self.cursor.rest();
        let close_at = match body_start.rfind("\"\"\"") {
            Some(idx) => idx,
            None => return TokenKind::Invalid("Unexpected end-of-input in string".to_string()),
        };
        let raw_body = &body_start[..close_at];

        let mut out = String::new();
        let mut chars = raw_body.char_indices().peekable();
        let mut borrowed_ok = true;
        while let Some((_, c)) = chars.next() {
            match c {
                '\\' => {
                    borrowed_ok = false;
                    match chars.peek().copied() {
                        Some((_, '\n')) | Some((_, ' ')) | Some((_, '\t')) | Some((_, '\r')) => {
                            // Line-ending backslash: consume through first
                            // non-whitespace of the next line.
                            let mut saw_newline = false;
                            while let Some(&(_, wc)) = chars.peek() {
                                if wc == '\n' {
                                    saw_newline = true;
                                    chars.next();
                                } else if wc.is_whitespace() {
                                    chars.next();
                                } else {
                                    break;
                                }
                            }
                            if !saw_newline {
                                return TokenKind::Invalid(
                                    "Invalid escape sequence '\\ '".to_string(),
                                );
                            }
                        }
                        Some((_, esc)) => {
                            chars.next();
                            match decode_escape(esc, &mut chars) {
                                Ok(decoded) => out.push(decoded),
                                Err(msg) => return TokenKind::Invalid(msg),
                            }
                        }
                        None => {
                            return TokenKind::Invalid(
                                "Unexpected end-of-input in string".to_string(),
                            )
                        }
                    }
                }
                '\t' if !self.version.allows_raw_tab_in_string() => {
                    return TokenKind::Invalid(
                        "Use \\t to represent a tab in a string (TOML versions before 1.0.0)"
                            .to_string(),
                    )
                }
                other => out.push(other),
            }
        }

        self.cursor.advance_by(raw_body);
        // Consume the closing delimiter; if more than 3 quotes precede it
        // (covered by the greedy rfind above) this always lands on `"""`.
        self.cursor.advance_by("\"\"\"");

        if borrowed_ok {
            TokenKind::Str(Cow::Borrowed(raw_body))
        } else {
            TokenKind::Str(Cow::Owned(out))
        }
    }

    fn scan_multiline_literal(&mut self) -> TokenKind<'a> {
        self.cursor.bump();
        self.cursor.bump();
        self.cursor.bump();
        if self.cursor.peek() == Some('\n') {
            self.cursor.bump();
        } else if self.cursor.starts_with("\r\n") {
            self.cursor.bump();
            self.cursor.bump();
        }

        let body_start = self.cursor.rest();
        let close_at = match body_start.rfind("'''") {
            Some(idx) => idx,
            None => return TokenKind::Invalid("Unexpected end-of-input in string".to_string()),
        };
        let raw_body = &body_start[..close_at];
        self.cursor.advance_by(raw_body);
        self.cursor.advance_by("'''");
        TokenKind::Str(Cow::Borrowed(raw_body))
    }

    fn scan_escape(&mut self) -> Result<char, String> {
        self.cursor.bump(); // backslash
        let escaped = self
            .cursor
            .peek()
            .ok_or_else(|| "Unexpected end-of-input in string".to_string())?;
        self.cursor.bump();
        match escaped {
            'b' => Ok('\u{8}'),
            't' => Ok('\t'),
            'n' => Ok('\n'),
            'f' => Ok('\u{c}'),
            'r' => Ok('\r'),
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            'u' => self.scan_unicode_escape(4),
            'U' => self.scan_unicode_escape(8),
            other => Err(format!("Invalid escape sequence '\\{other}'")),
        }
    }

    fn scan_unicode_escape(&mut self, digits: usize) -> Result<char, String> {
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            match self.cursor.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.cursor.bump();
                }
                Some(_) | None => return Err("Invalid unicode escape sequence".to_string()),
            }
        }
        let code = u32::from_str_radix(&hex, 16).expect("validated hex digits");
        if (0xD800..=0xDFFF).contains(&code) {
            return Err("Invalid unicode escape sequence".to_string());
        }
        char::from_u32(code).ok_or_else(|| "Invalid unicode escape sequence".to_string())
    }
}

/// Decode a single escape sequence found inside a multiline basic string's
/// raw body (the body text has already been sliced out by the caller, so
/// this walks a `Peekable<CharIndices>` instead of the live cursor).
fn decode_escape(
    escaped: char,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<char, String> {
    match escaped {
        'b' => Ok('\u{8}'),
        't' => Ok('\t'),
        'n' => Ok('\n'),
        'f' => Ok('\u{c}'),
        'r' => Ok('\r'),
        '"' => Ok('"'),
        '\\' => Ok('\\'),
        'u' => decode_unicode_escape(chars, 4),
        'U' => decode_unicode_escape(chars, 8),
        other => Err(format!("Invalid escape sequence '\\{other}'")),
    }
}

fn decode_unicode_escape(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    digits: usize,
) -> Result<char, String> {
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
        match chars.next() {
            Some((_, c)) if c.is_ascii_hexdigit() => hex.push(c),
            _ => return Err("Invalid unicode escape sequence".to_string()),
        }
    }
    let code = u32::from_str_radix(&hex, 16).expect("validated hex digits");
    if (0xD800..=0xDFFF).contains(&code) {
        return Err("Invalid unicode escape sequence".to_string());
    }
    char::from_u32(code).ok_or_else(|| "Invalid unicode escape sequence".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<TokenKind<'_>> {
        let mut lexer = Lexer::new(input, TomlVersion::V1_0_0);
        let mut out = Vec::new();
        loop {
            let t = lexer.expect_key();
            let eof = matches!(t.kind, TokenKind::Eof);
            out.push(t.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn bare_key_and_equals() {
        let toks = tokens("foo = 1");
        assert_eq!(toks[0], TokenKind::Bare("foo"));
        assert_eq!(toks[1], TokenKind::Equals);
    }

    #[test]
    fn multiline_basic_strips_leading_newline() {
        let mut lexer = Lexer::new("\"\"\"\n  foobar\"\"\"", TomlVersion::V1_0_0);
        let t = lexer.expect_value();
        assert_eq!(t.kind, TokenKind::Str(Cow::Borrowed("  foobar")));
    }

    #[test]
    fn datetime_recognized_in_value_mode() {
        let mut lexer = Lexer::new("1979-05-27", TomlVersion::V1_0_0);
        let t = lexer.expect_value();
        assert!(matches!(t.kind, TokenKind::Datetime(_)));
    }

    #[test]
    fn digits_with_dashes_are_bare_key_in_key_mode() {
        let mut lexer = Lexer::new("1979-05-27", TomlVersion::V1_0_0);
        let t = lexer.expect_key();
        assert_eq!(t.kind, TokenKind::Bare("1979-05-27"));
    }
}
