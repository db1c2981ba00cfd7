//! Canonical TOML emission.
//!
//! Each table prints its own non-table, non-table-array entries as
//! `key = value` lines before descending into subtables, so a table's direct
//! scalar content always reads together under its own header instead of
//! being interleaved with its children's.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{array::ArrayKind, lex::is_bare_key_char, Array, Table, Value};

/// Render `table` as a complete canonical TOML document.
pub(crate) fn to_toml(table: &Table<'_>) -> String {
    let mut out = String::new();
    write_leaves(&mut out, table);
    write_children(&mut out, table, &mut Vec::new());
    out
}

fn write_leaves(out: &mut String, table: &Table<'_>) {
    for (key, value) in table.iter() {
        if is_table_like(value) {
            continue;
        }
        write_key(out, key);
        out.push_str(" = ");
        write_value(out, value);
        out.push('\n');
    }
}

fn write_children<'a>(out: &mut String, table: &Table<'a>, path: &mut Vec<Cow<'a, str>>) {
    for (key, value) in table.iter() {
        match value {
            Value::Table(t) => {
                path.push(Cow::Owned(key.to_string()));
                write_header(out, path, false);
                write_leaves(out, t);
                write_children(out, t, path);
                path.pop();
            }
            Value::Array(a) if a.kind() == ArrayKind::TableArray => {
                path.push(Cow::Owned(key.to_string()));
                for element in a.iter() {
                    let Value::Table(t) = element else {
                        continue;
                    };
                    write_header(out, path, true);
                    write_leaves(out, t);
                    write_children(out, t, path);
                }
                path.pop();
            }
            _ => {}
        }
    }
}

fn write_header(out: &mut String, path: &[Cow<'_, str>], is_array: bool) {
    out.push_str(if is_array { "[[" } else { "[" });
    for (i, seg) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        write_key(out, seg);
    }
    out.push_str(if is_array { "]]" } else { "]" });
    out.push('\n');
}

fn is_table_like(value: &Value<'_>) -> bool {
    matches!(value, Value::Table(_))
        || matches!(value, Value::Array(a) if a.kind() == ArrayKind::TableArray)
}

fn write_key(out: &mut String, key: &str) {
    if !key.is_empty() && key.chars().all(is_bare_key_char) {
        out.push_str(key);
    } else {
        write_quoted_string(out, key);
    }
}

fn write_value(out: &mut String, value: &Value<'_>) {
    match value {
        Value::String(s) => write_quoted_string(out, s),
        Value::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) => write_float(out, *f),
        Value::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        Value::OffsetDateTime(dt) => {
            let _ = write!(out, "{dt}");
        }
        Value::LocalDateTime(dt) => {
            let _ = write!(out, "{dt}");
        }
        Value::LocalDate(d) => {
            let _ = write!(out, "{d}");
        }
        Value::LocalTime(t) => {
            let _ = write!(out, "{t}");
        }
        Value::Array(a) => write_array(out, a),
        Value::Table(t) => write_inline_table(out, t),
    }
}

fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f < 0.0 { "-inf" } else { "inf" });
    } else if f == f.trunc() && f.abs() < 1e17 {
        let _ = write!(out, "{f:.1}");
    } else {
        let _ = write!(out, "{f}");
    }
}

fn write_array(out: &mut String, array: &Array<'_>) {
    out.push('[');
    for (i, v) in array.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, v);
    }
    out.push(']');
}

fn write_inline_table(out: &mut String, table: &Table<'_>) {
    out.push_str("{ ");
    for (i, (key, value)) in table.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_key(out, key);
        out.push_str(" = ");
        write_value(out, value);
    }
    out.push_str(" }");
}

fn write_quoted_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn leaves_precede_subtables() {
        let r = parse("[a]\nx = 1\n[a.b]\ny = 2\n");
        let rendered = to_toml(r.root());
        let a_pos = rendered.find("[a]").unwrap();
        let ab_pos = rendered.find("[a.b]").unwrap();
        assert!(a_pos < ab_pos);
        assert!(rendered.contains("x = 1"));
        assert!(rendered.contains("y = 2"));
    }

    #[test]
    fn table_array_headers_use_double_brackets() {
        let r = parse("[[points]]\nx = 1\n[[points]]\nx = 2\n");
        let rendered = to_toml(r.root());
        assert_eq!(rendered.matches("[[points]]").count(), 2);
    }

    #[test]
    fn non_bare_keys_are_quoted() {
        let r = parse("\"has space\" = 1\n");
        let rendered = to_toml(r.root());
        assert!(rendered.contains("\"has space\" = 1"));
    }
}
