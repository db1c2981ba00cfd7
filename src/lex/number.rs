//! Integer, float, and boolean leaf grammars.
//!
//! Ported from the teacher's `src/parse/numbers.rs` near-verbatim: these are
//! `winnow` combinators over an already-isolated `&str`, run by
//! [`super::Cursor`] against its remaining input and then replayed through
//! [`super::Cursor::advance_by`] so position tracking stays authoritative.

use core::ops::RangeInclusive;

use winnow::{
    combinator::{alt, cut_err, opt, peek, preceded, repeat, trace},
    dispatch,
    error::{StrContext, StrContextValue},
    token::{one_of, take},
    ModalResult, Parser,
};

// boolean = true / false
pub(crate) fn boolean(input: &mut &str) -> ModalResult<bool> {
    trace("boolean", alt((true_, false_))).parse_next(input)
}

fn true_(input: &mut &str) -> ModalResult<bool> {
    (peek(TRUE), cut_err(TRUE)).value(true).parse_next(input)
}

fn false_(input: &mut &str) -> ModalResult<bool> {
    (peek(FALSE), cut_err(FALSE)).value(false).parse_next(input)
}
const TRUE: &str = "true";
const FALSE: &str = "false";

/// The matched text of an integer literal, radix-tagged but not yet
/// converted to `i64` — conversion happens at the call site so overflow can
/// be reported as "Integer is too large" rather than a generic parse
/// failure (spec.md §4.1).
#[derive(Debug, Clone, Copy)]
pub(crate) enum IntegerLiteral<'i> {
    Dec(&'i str),
    Hex(&'i str),
    Oct(&'i str),
    Bin(&'i str),
}

// integer = dec-int / hex-int / oct-int / bin-int
pub(crate) fn integer(input: &mut &str) -> ModalResult<IntegerLiteral<'_>> {
    trace(
        "integer",
        dispatch! {peek(opt::<_, &str, _, _>(take(2usize)));
            Some("0x") => hex_int.map(IntegerLiteral::Hex),
            Some("0o") => oct_int.map(IntegerLiteral::Oct),
            Some("0b") => bin_int.map(IntegerLiteral::Bin),
            _ => dec_int.map(IntegerLiteral::Dec),
        },
    )
    .parse_next(input)
}

/// Convert a matched literal to `i64`, reporting overflow the way spec.md
/// §4.1 requires instead of a generic number-shape error.
pub(crate) fn classify_integer(lit: IntegerLiteral<'_>) -> Result<i64, &'static str> {
    let result = match lit {
        IntegerLiteral::Dec(s) => s.replace('_', "").parse::<i64>(),
        IntegerLiteral::Hex(s) => i64::from_str_radix(&s.replace('_', ""), 16),
        IntegerLiteral::Oct(s) => i64::from_str_radix(&s.replace('_', ""), 8),
        IntegerLiteral::Bin(s) => i64::from_str_radix(&s.replace('_', ""), 2),
    };
    result.map_err(|_| "Integer is too large")
}

fn dec_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "dec-int",
        (
            opt(one_of((b'+', b'-'))),
            alt((
                (
                    one_of(DIGIT1_9),
                    repeat(
                        0..,
                        alt((
                            digit.void(),
                            (
                                one_of(b'_'),
                                cut_err(digit)
                                    .context(StrContext::Expected(StrContextValue::Description("digit"))),
                            )
                                .void(),
                        )),
                    )
                    .map(|()| ()),
                )
                    .void(),
                digit.void(),
            )),
        )
            .take()
            .context(StrContext::Label("integer")),
    )
    .parse_next(input)
}
const DIGIT1_9: RangeInclusive<u8> = b'1'..=b'9';

fn hex_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "hex-int",
        preceded(
            HEX_PREFIX,
            cut_err((
                hexdig,
                repeat(
                    0..,
                    alt((
                        hexdig.void(),
                        (
                            one_of('_'),
                            cut_err(hexdig)
                                .context(StrContext::Expected(StrContextValue::Description("digit"))),
                        )
                            .void(),
                    )),
                )
                .map(|()| ()),
            ))
            .take(),
        )
        .context(StrContext::Label("hexadecimal integer")),
    )
    .parse_next(input)
}
const HEX_PREFIX: &str = "0x";

fn oct_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "oct-int",
        preceded(
            OCT_PREFIX,
            cut_err((
                one_of(DIGIT0_7),
                repeat(
                    0..,
                    alt((
                        one_of(DIGIT0_7).void(),
                        (
                            one_of(b'_'),
                            cut_err(one_of(DIGIT0_7))
                                .context(StrContext::Expected(StrContextValue::Description("digit"))),
                        )
                            .void(),
                    )),
                )
                .map(|()| ()),
            ))
            .take(),
        )
        .context(StrContext::Label("octal integer")),
    )
    .parse_next(input)
}
const OCT_PREFIX: &str = "0o";
const DIGIT0_7: RangeInclusive<u8> = b'0'..=b'7';

fn bin_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "bin-int",
        preceded(
            BIN_PREFIX,
            cut_err((
                one_of(DIGIT0_1),
                repeat(
                    0..,
                    alt((
                        one_of(DIGIT0_1).void(),
                        (
                            one_of(b'_'),
                            cut_err(one_of(DIGIT0_1))
                                .context(StrContext::Expected(StrContextValue::Description("digit"))),
                        )
                            .void(),
                    )),
                )
                .map(|()| ()),
            ))
            .take(),
        )
        .context(StrContext::Label("binary integer")),
    )
    .parse_next(input)
}
const BIN_PREFIX: &str = "0b";
const DIGIT0_1: RangeInclusive<u8> = b'0'..=b'1';

// float = float-int-part ( exp / frac [ exp ] )
// float =/ special-float
//
// Returns the matched text rather than a parsed `f64`: overflow ("Float is
// too large") and underflow ("Float is too small") are reported by the
// caller once the text is classified, per spec.md §4.1.
pub(crate) fn float<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "float",
        alt((float_, special_float_text)).context(StrContext::Label("floating-point number")),
    )
    .parse_next(input)
}

fn special_float_text<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (opt(one_of((b'+', b'-'))), alt((INF, NAN)))
        .take()
        .parse_next(input)
}

/// Convert a matched literal to `f64`, distinguishing overflow/underflow
/// from an ordinary finite value (spec.md §4.1).
pub(crate) fn classify_float(text: &str) -> Result<f64, &'static str> {
    let cleaned = text.replace('_', "");
    if cleaned.ends_with("inf") || cleaned.ends_with("nan") {
        return Ok(cleaned.parse().expect("special-float grammar guarantees a valid literal"));
    }
    let value: f64 = cleaned.parse().expect("float grammar guarantees a valid literal");
    if value.is_infinite() {
        return Err("Float is too large");
    }
    let has_nonzero_digit = cleaned
        .trim_start_matches(['+', '-'])
        .chars()
        .any(|c| c.is_ascii_digit() && c != '0');
    // spec.md: underflow is a nonzero literal whose magnitude falls below
    // the smallest normal f64, whether it rounds all the way to zero or
    // lands in subnormal range.
    if has_nonzero_digit && value.abs() < f64::MIN_POSITIVE {
        return Err("Float is too small");
    }
    Ok(value)
}

fn float_<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        dec_int,
        alt((exp.void(), (frac.void(), opt(exp.void())).void())),
    )
        .take()
        .parse_next(input)
}

fn frac<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        '.',
        cut_err(zero_prefixable_int)
            .context(StrContext::Expected(StrContextValue::Description("digit"))),
    )
        .take()
        .parse_next(input)
}

fn zero_prefixable_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        digit,
        repeat(
            0..,
            alt((
                digit.void(),
                (
                    one_of(b'_'),
                    cut_err(digit)
                        .context(StrContext::Expected(StrContextValue::Description("digit"))),
                )
                    .void(),
            )),
        )
        .map(|()| ()),
    )
        .take()
        .parse_next(input)
}

fn exp<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of((b'e', b'E')),
        opt(one_of([b'+', b'-'])),
        cut_err(zero_prefixable_int),
    )
        .take()
        .parse_next(input)
}

const INF: &str = "inf";
const NAN: &str = "nan";

fn digit(input: &mut &str) -> ModalResult<char> {
    one_of(DIGIT).parse_next(input)
}
const DIGIT: RangeInclusive<u8> = b'0'..=b'9';

fn hexdig(input: &mut &str) -> ModalResult<char> {
    one_of(HEXDIG).parse_next(input)
}
const HEXDIG: (RangeInclusive<u8>, RangeInclusive<u8>, RangeInclusive<u8>) =
    (DIGIT, b'A'..=b'F', b'a'..=b'f');

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_overflow_is_rejected() {
        assert_eq!(classify_float("1E1000"), Err("Float is too large"));
    }

    #[test]
    fn float_underflow_is_rejected() {
        assert_eq!(classify_float("1E-400"), Err("Float is too small"));
    }

    #[test]
    fn float_in_normal_range_is_accepted() {
        assert_eq!(classify_float("1E-41"), Ok(1e-41));
    }

    #[test]
    fn integer_overflow_is_rejected() {
        let mut input = "99999999999999999999";
        let lit = integer(&mut input).unwrap();
        assert_eq!(classify_integer(lit), Err("Integer is too large"));
    }

    #[test]
    fn hex_integer_in_range_is_accepted() {
        let mut input = "0xff";
        let lit = integer(&mut input).unwrap();
        assert_eq!(classify_integer(lit), Ok(255));
    }
}
