//! The TOML value model.

use std::borrow::Cow;

use crate::{
    datetime::{LocalDate, LocalDateTime, LocalTime, OffsetDateTime},
    Array, Table,
};

/// A parsed TOML value.
///
/// This is a closed, tagged union over the ten value kinds TOML defines; it
/// is never constructed by anything other than [`crate::parse`] and is never
/// mutated after a parse completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A basic, literal, or multiline string. Borrowed from the source when
    /// it required no escape decoding, owned otherwise.
    String(Cow<'a, str>),
    /// A 64-bit signed integer.
    Integer(i64),
    /// An IEEE-754 double.
    Float(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// An RFC 3339 date-time with an offset.
    OffsetDateTime(OffsetDateTime),
    /// An RFC 3339 date-time with no offset.
    LocalDateTime(LocalDateTime),
    /// A bare calendar date.
    LocalDate(LocalDate),
    /// A bare time of day.
    LocalTime(LocalTime),
    /// A sequence of values.
    Array(Array<'a>),
    /// A table of key-value pairs.
    Table(Table<'a>),
}

impl<'a> Value<'a> {
    /// The kind name used in type-mismatch error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::OffsetDateTime(_) => "offset date-time",
            Value::LocalDateTime(_) => "local date-time",
            Value::LocalDate(_) => "local date",
            Value::LocalTime(_) => "local time",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }

    /// If this is a [`Value::String`], returns its content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// If this is a [`Value::Integer`], returns it.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// If this is a [`Value::Float`], returns it.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If this is a [`Value::Boolean`], returns it.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// If this is a [`Value::Array`], returns it.
    pub fn as_array(&self) -> Option<&Array<'a>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// If this is a [`Value::Table`], returns it.
    pub fn as_table(&self) -> Option<&Table<'a>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// Structural equality between two values, ignoring defining positions and
/// table/array provenance flags.
///
/// Tables compare as order-insensitive multisets of key-value pairs; arrays
/// compare elementwise, in order.
pub fn equals(a: &Value<'_>, b: &Value<'_>) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits() || a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::OffsetDateTime(a), Value::OffsetDateTime(b)) => a == b,
        (Value::LocalDateTime(a), Value::LocalDateTime(b)) => a == b,
        (Value::LocalDate(a), Value::LocalDate(b)) => a == b,
        (Value::LocalTime(a), Value::LocalTime(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => arrays_equal(a, b),
        (Value::Table(a), Value::Table(b)) => tables_equal(a, b),
        _ => false,
    }
}

pub(crate) fn arrays_equal(a: &Array<'_>, b: &Array<'_>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| equals(a, b))
}

pub(crate) fn tables_equal(a: &Table<'_>, b: &Table<'_>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .all(|(key, value)| matches!(b.get(key), Some(other) if equals(value, other)))
}
