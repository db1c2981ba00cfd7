//! Date/time component leaf grammar.
//!
//! Ported from the teacher's `src/parse/datetime.rs`; the shape returned is
//! a [`RawComponents`] (date/time/offset, each optional) rather than the
//! teacher's single `Datetime` struct, since this crate splits that into the
//! four TOML datetime kinds.
//!
//! The grammar functions below only recognize *shape* (the right number of
//! digits in the right places) — they never reject an out-of-range value.
//! Range and calendar validation happens afterward, in [`classify`], the
//! same way [`super::number::classify_float`] and
//! [`super::number::classify_integer`] defer overflow/underflow
//! classification to plain Rust instead of threading it through `winnow`.
//! This is what lets a malformed component (`2023-02-30`, `25:00:00`) carry
//! a message naming the offending component and value instead of collapsing
//! into the lexer's generic "Invalid number or date/time literal" fallback.

use core::ops::RangeInclusive;

use winnow::{
    combinator::{alt, cut_err, opt, preceded, trace},
    token::{one_of, take_while},
    ModalResult, Parser,
};

use crate::datetime::{
    days_in_month, Date, LocalDate, LocalDateTime, LocalTime, Offset, OffsetDateTime, Time,
};
use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RawComponents {
    pub(crate) date: Option<RawDate>,
    pub(crate) time: Option<RawTime>,
    pub(crate) offset: Option<RawOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawDate {
    year: u16,
    month: u8,
    day: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawTime {
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawOffset {
    Z,
    Custom { negative: bool, hour: u8, minute: u8 },
}

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

fn validate_date(raw: RawDate) -> Result<Date, String> {
    if !(1..=12).contains(&raw.month) {
        return Err(format!("Invalid month '{}'", raw.month));
    }
    let max_day = days_in_month(raw.year, raw.month);
    if raw.day < 1 || raw.day > max_day {
        let month_name = MONTH_NAMES[usize::from(raw.month) - 1];
        return Err(format!("Invalid date '{month_name} {}'", raw.day));
    }
    Ok(Date {
        year: raw.year,
        month: raw.month,
        day: raw.day,
    })
}

fn validate_time(raw: RawTime) -> Result<Time, String> {
    if raw.hour > 23 {
        return Err(format!("Invalid hour '{}'", raw.hour));
    }
    if raw.minute > 59 {
        return Err(format!("Invalid minute '{}'", raw.minute));
    }
    // A leap second (`:60`) is out of range per spec.md §4.1's explicit
    // "second 00..59" (the teacher's `parse/datetime.rs` instead allowed
    // `00..=60` for leap-second rules; this crate does not).
    if raw.second > 59 {
        return Err(format!("Invalid second '{}'", raw.second));
    }
    Ok(Time {
        hour: raw.hour,
        minute: raw.minute,
        second: raw.second,
        nanosecond: raw.nanosecond,
    })
}

fn validate_offset(raw: RawOffset) -> Result<Offset, String> {
    match raw {
        RawOffset::Z => Ok(Offset::Z),
        RawOffset::Custom { negative, hour, minute } => {
            if hour > 18 {
                return Err(format!("Invalid offset hour '{hour}'"));
            }
            if minute > 59 {
                return Err(format!("Invalid offset minute '{minute}'"));
            }
            let magnitude = i16::from(hour) * 60 + i16::from(minute);
            if magnitude > 18 * 60 {
                return Err(format!(
                    "Invalid offset '{}{:02}:{:02}'",
                    if negative { '-' } else { '+' },
                    hour,
                    minute
                ));
            }
            let minutes = if negative { -magnitude } else { magnitude };
            Ok(Offset::Custom { minutes })
        }
    }
}

/// Validate and fold a [`RawComponents`] into the one TOML datetime `Value`
/// variant it describes, or the message for whichever component first
/// fails validation.
pub(crate) fn classify(raw: RawComponents) -> Result<Value<'static>, String> {
    let date = raw.date.map(validate_date).transpose()?;
    let time = raw.time.map(validate_time).transpose()?;
    let offset = raw.offset.map(validate_offset).transpose()?;

    match (date, time, offset) {
        (Some(date), Some(time), Some(offset)) => {
            Ok(Value::OffsetDateTime(OffsetDateTime { date, time, offset }))
        }
        (Some(date), Some(time), None) => Ok(Value::LocalDateTime(LocalDateTime { date, time })),
        (Some(date), None, None) => Ok(Value::LocalDate(LocalDate(date))),
        (None, Some(time), None) => Ok(Value::LocalTime(LocalTime(time))),
        _ => Err("Invalid date/time literal".to_string()),
    }
}

// date-time = offset-date-time / local-date-time / local-date / local-time
pub(crate) fn date_time(input: &mut &str) -> ModalResult<RawComponents> {
    trace(
        "date-time",
        alt((
            (full_date, opt((time_delim, partial_time, opt(time_offset)))).map(|(date, opt)| {
                match opt {
                    Some((_, time, offset)) => RawComponents {
                        date: Some(date),
                        time: Some(time),
                        offset,
                    },
                    None => RawComponents {
                        date: Some(date),
                        time: None,
                        offset: None,
                    },
                }
            }),
            partial_time.map(|t| RawComponents {
                date: None,
                time: Some(t),
                offset: None,
            }),
        )),
    )
    .parse_next(input)
}

fn full_date(input: &mut &str) -> ModalResult<RawDate> {
    trace(
        "full-date",
        (date_fullyear, '-', cut_err(date_month), cut_err('-'), cut_err(date_mday)).map(
            |(year, _, month, _, day)| RawDate { year, month, day },
        ),
    )
    .parse_next(input)
}

fn partial_time(input: &mut &str) -> ModalResult<RawTime> {
    trace(
        "partial-time",
        (
            time_hour,
            ':',
            cut_err((time_minute, ':', time_second, opt(time_secfrac))),
        )
            .map(|(hour, _, (minute, _, second, nanosecond))| RawTime {
                hour,
                minute,
                second,
                nanosecond: nanosecond.unwrap_or_default(),
            }),
    )
    .parse_next(input)
}

fn time_offset(input: &mut &str) -> ModalResult<RawOffset> {
    trace(
        "time-offset",
        alt((
            one_of(('Z', 'z')).value(RawOffset::Z),
            (one_of(('+', '-')), cut_err((time_hour, ':', time_minute))).map(
                |(sign, (hour, _, minute))| RawOffset::Custom {
                    negative: sign == '-',
                    hour,
                    minute,
                },
            ),
        )),
    )
    .parse_next(input)
}

fn date_fullyear(input: &mut &str) -> ModalResult<u16> {
    unsigned_digits::<4, 4>
        .map(|s: &str| s.parse::<u16>().expect("4DIGIT should match u16"))
        .parse_next(input)
}

fn date_month(input: &mut &str) -> ModalResult<u8> {
    unsigned_digits::<2, 2>
        .map(|s: &str| s.parse::<u8>().expect("2DIGIT should match u8"))
        .parse_next(input)
}

fn date_mday(input: &mut &str) -> ModalResult<u8> {
    unsigned_digits::<2, 2>
        .map(|s: &str| s.parse::<u8>().expect("2DIGIT should match u8"))
        .parse_next(input)
}

fn time_delim(input: &mut &str) -> ModalResult<char> {
    one_of(TIME_DELIM).parse_next(input)
}
const TIME_DELIM: (u8, u8, u8) = (b'T', b't', b' ');

fn time_hour(input: &mut &str) -> ModalResult<u8> {
    unsigned_digits::<2, 2>
        .map(|s: &str| s.parse::<u8>().expect("2DIGIT should match u8"))
        .parse_next(input)
}

fn time_minute(input: &mut &str) -> ModalResult<u8> {
    unsigned_digits::<2, 2>
        .map(|s: &str| s.parse::<u8>().expect("2DIGIT should match u8"))
        .parse_next(input)
}

fn time_second(input: &mut &str) -> ModalResult<u8> {
    unsigned_digits::<2, 2>
        .map(|s: &str| s.parse::<u8>().expect("2DIGIT should match u8"))
        .parse_next(input)
}

fn time_secfrac(input: &mut &str) -> ModalResult<u32> {
    static SCALE: [u32; 10] = [
        0, 100_000_000, 10_000_000, 1_000_000, 100_000, 10_000, 1_000, 100, 10, 1,
    ];
    const INF: usize = usize::MAX;
    preceded('.', unsigned_digits::<1, INF>)
        .map(|mut repr: &str| {
            let max_digits = SCALE.len() - 1;
            if max_digits < repr.len() {
                repr = &repr[0..max_digits];
            }
            let v = repr.parse::<u32>().expect("digits should fit once truncated");
            let num_digits = repr.len();
            let scale = SCALE[num_digits];
            v * scale
        })
        .parse_next(input)
}

fn unsigned_digits<'i, const MIN: usize, const MAX: usize>(
    input: &mut &'i str,
) -> ModalResult<&'i str> {
    take_while(MIN..=MAX, DIGIT).parse_next(input)
}
const DIGIT: RangeInclusive<u8> = b'0'..=b'9';

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(input: &str) -> Result<Value<'static>, String> {
        let mut s = input;
        let raw = date_time(&mut s).expect("shape should parse");
        classify(raw)
    }

    #[test]
    fn invalid_day_for_month_names_the_month() {
        assert_eq!(
            classify_str("2023-02-30"),
            Err("Invalid date 'FEBRUARY 30'".to_string())
        );
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert_eq!(classify_str("2023-13-01"), Err("Invalid month '13'".to_string()));
    }

    #[test]
    fn leap_second_is_rejected() {
        assert_eq!(
            classify_str("1979-05-27T07:32:60"),
            Err("Invalid second '60'".to_string())
        );
    }

    #[test]
    fn invalid_hour_is_rejected() {
        assert_eq!(
            classify_str("1979-05-27T25:00:00"),
            Err("Invalid hour '25'".to_string())
        );
    }

    #[test]
    fn offset_beyond_18_hours_is_rejected() {
        assert_eq!(
            classify_str("1979-05-27T07:32:00+18:30"),
            Err("Invalid offset '+18:30'".to_string())
        );
    }

    #[test]
    fn valid_offset_date_time_is_accepted() {
        assert_eq!(
            classify_str("1979-05-27T07:32:00Z"),
            Ok(Value::OffsetDateTime(OffsetDateTime {
                date: Date {
                    year: 1979,
                    month: 5,
                    day: 27,
                },
                time: Time {
                    hour: 7,
                    minute: 32,
                    second: 0,
                    nanosecond: 0,
                },
                offset: Offset::Z,
            }))
        );
    }
}
