//! 2-space-indented JSON emission.
//!
//! Datetimes render as their RFC 3339-ish `Display` strings (`datetime.rs`);
//! every other TOML kind maps onto the JSON value it already resembles.
//! Control characters inside strings escape as `\uXXXX`, matching the
//! lexer's own diagnostic rendering (`error::render_char`) rather than
//! leaving them raw.

use std::fmt::Write as _;

use crate::{Array, Table, Value};

const INDENT: &str = "  ";

/// Render `table` as pretty-printed JSON.
pub(crate) fn to_json(table: &Table<'_>) -> String {
    let mut out = String::new();
    write_table(&mut out, table, 0);
    out
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_table(out: &mut String, table: &Table<'_>, depth: usize) {
    if table.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (i, (key, value)) in table.iter().enumerate() {
        push_indent(out, depth + 1);
        write_json_string(out, key);
        out.push_str(": ");
        write_value(out, value, depth + 1);
        if i + 1 < table.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, depth);
    out.push('}');
}

fn write_array(out: &mut String, array: &Array<'_>, depth: usize) {
    if array.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push_str("[\n");
    for (i, value) in array.iter().enumerate() {
        push_indent(out, depth + 1);
        write_value(out, value, depth + 1);
        if i + 1 < array.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, depth);
    out.push(']');
}

fn write_value(out: &mut String, value: &Value<'_>, depth: usize) {
    match value {
        Value::String(s) => write_json_string(out, s),
        Value::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) => write_json_float(out, *f),
        Value::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        Value::OffsetDateTime(dt) => write_json_string(out, &dt.to_string()),
        Value::LocalDateTime(dt) => write_json_string(out, &dt.to_string()),
        Value::LocalDate(d) => write_json_string(out, &d.to_string()),
        Value::LocalTime(t) => write_json_string(out, &t.to_string()),
        Value::Array(a) => write_array(out, a, depth),
        Value::Table(t) => write_table(out, t, depth),
    }
}

fn write_json_float(out: &mut String, f: f64) {
    if f.is_finite() {
        let _ = write!(out, "{f}");
    } else {
        // JSON has no inf/nan; render as a string rather than invalid JSON.
        write_json_string(out, &f.to_string());
    }
}

fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
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
    fn scalars_round_trip_to_json_shapes() {
        let r = parse("name = \"ferris\"\ncount = 3\nok = true\n");
        let rendered = to_json(r.root());
        assert!(rendered.contains("\"name\": \"ferris\""));
        assert!(rendered.contains("\"count\": 3"));
        assert!(rendered.contains("\"ok\": true"));
    }

    #[test]
    fn nested_tables_indent_by_two_spaces() {
        let r = parse("[a]\nb = 1\n");
        let rendered = to_json(r.root());
        assert!(rendered.contains("\"a\": {\n    \"b\": 1\n  }"));
    }

    #[test]
    fn datetime_renders_as_string() {
        let r = parse("d = 1979-05-27T07:32:00Z\n");
        let rendered = to_json(r.root());
        assert!(rendered.contains("\"d\": \"1979-05-27T07:32:00Z\""));
    }
}
