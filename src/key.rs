//! The dotted-key lookup micro-grammar.
//!
//! This is deliberately independent of the document lexer/parser: it is the
//! small sub-parser the public typed accessors use to turn a caller-supplied
//! string like `"foo. \"bar\".baz"` into `["foo", "bar", "baz"]`. Unlike the
//! document parser, which collects errors and keeps going, this one fails
//! outright on the first problem — it is a caller-observable error, not a
//! parse diagnostic (see spec.md §9).

use std::fmt;

/// A single segment of a dotted key path.
pub type KeySegment = String;

/// The key micro-grammar rejected its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyError {
    message: String,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for KeyError {}

impl KeyError {
    fn unexpected(found: impl fmt::Display, expected: &str) -> Self {
        KeyError {
            message: format!("Invalid key: Unexpected '{found}', expected {expected}"),
        }
    }

    fn unexpected_eoi(expected: &str) -> Self {
        KeyError {
            message: format!("Invalid key: Unexpected end-of-input, expected {expected}"),
        }
    }
}

/// Split a dotted-key lookup string into its segments.
///
/// Accepts the same key syntax as TOML documents: bare segments
/// (`[A-Za-z0-9_-]+`), `"basic"` segments (with the usual escapes),
/// `'literal'` segments, separated by `.`, with whitespace tolerated around
/// the dots (but not inside a bare segment).
pub fn split_key(input: &str) -> Result<Vec<KeySegment>, KeyError> {
    let mut chars = input.chars().peekable();
    let mut segments = Vec::new();

    loop {
        skip_spaces(&mut chars);
        let segment = parse_segment(&mut chars)?;
        segments.push(segment);
        skip_spaces(&mut chars);
        match chars.peek() {
            None => break,
            Some('.') => {
                chars.next();
            }
            Some(&c) => return Err(KeyError::unexpected(c, ". or end-of-input")),
        }
    }

    Ok(segments)
}

fn skip_spaces(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while matches!(chars.peek(), Some(' ') | Some('\t')) {
        chars.next();
    }
}

fn parse_segment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String, KeyError> {
    match chars.peek() {
        Some('"') => parse_quoted(chars, '"', true),
        Some('\'') => parse_quoted(chars, '\'', false),
        Some(&c) if is_bare_key_char(c) => Ok(parse_bare(chars)),
        Some(&c) => Err(KeyError::unexpected(c, "a key segment")),
        None => Err(KeyError::unexpected_eoi("a key segment")),
    }
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn parse_bare(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(&c) = chars.peek() {
        if is_bare_key_char(c) {
            s.push(c);
            chars.next();
        } else {
            break;
        }
    }
    s
}

fn parse_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
    escapes: bool,
) -> Result<String, KeyError> {
    chars.next(); // consume opening quote
    let mut s = String::new();
    loop {
        match chars.next() {
            None => return Err(KeyError::unexpected_eoi("a closing quote")),
            Some(c) if c == quote => break,
            Some('\\') if escapes => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| KeyError::unexpected_eoi("an escape sequence"))?;
                s.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    '"' => '"',
                    '\\' => '\\',
                    'u' => parse_unicode_escape(chars, 4)?,
                    'U' => parse_unicode_escape(chars, 8)?,
                    other => {
                        return Err(KeyError::unexpected(
                            other,
                            "a valid escape sequence",
                        ))
                    }
                });
            }
            Some(c) => s.push(c),
        }
    }
    Ok(s)
}

fn parse_unicode_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
) -> Result<char, KeyError> {
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
        match chars.next() {
            Some(c) if c.is_ascii_hexdigit() => hex.push(c),
            Some(c) => return Err(KeyError::unexpected(c, "a hex digit")),
            None => return Err(KeyError::unexpected_eoi("a hex digit")),
        }
    }
    let code = u32::from_str_radix(&hex, 16).expect("validated hex digits");
    char::from_u32(code).ok_or_else(|| KeyError {
        message: "Invalid key: Invalid unicode escape sequence".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_segments() {
        assert_eq!(split_key("a.b.c").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn whitespace_around_dots() {
        assert_eq!(
            split_key(" foo  . \" bar\\t\" . -baz").unwrap(),
            vec!["foo", " bar\t", "-baz"]
        );
    }

    #[test]
    fn literal_segment_no_escapes() {
        assert_eq!(split_key("'a\\nb'").unwrap(), vec!["a\\nb"]);
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        let err = split_key("foo bar").unwrap_err();
        assert!(err.to_string().contains("Unexpected 'b'"));
    }
}
