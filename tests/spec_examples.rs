//! The concrete end-to-end scenarios and boundary behaviors from spec.md §8.

use tomling::{parse, parse_with_version, TomlVersion, Value};

#[test]
fn scenario_1_escaped_key_and_binary_integer() {
    let r = parse("\"foo\\nba\\\"r\" = 0b11111111");
    assert!(!r.has_errors());
    assert_eq!(r.root().len(), 1);
    let (key, value) = r.root().iter().next().unwrap();
    assert_eq!(key, "foo\nba\"r");
    assert_eq!(value.as_integer(), Some(255));
}

#[test]
fn scenario_2_dotted_lookup_path_with_whitespace_and_escapes() {
    let r = parse(" foo  . \" bar\\t\" . -baz = 0x000a");
    assert!(!r.has_errors());
    let value = r
        .root()
        .get_path_segments(&["foo", " bar\t", "-baz"])
        .unwrap();
    assert_eq!(value.as_integer(), Some(10));
}

#[test]
fn scenario_3_nested_headers_preserve_order_in_json() {
    let r = parse("[a.b.c]\nanswer = 42\n\n[a]\nbetter = 43\n");
    assert!(!r.has_errors());
    let json = r.to_json();
    // Order preservation (spec.md §8): "b" (from the [a.b.c] header) comes
    // before "better" (from the later [a] header) since it was defined
    // first.
    let b_pos = json.find("\"b\"").unwrap();
    let better_pos = json.find("\"better\"").unwrap();
    assert!(b_pos < better_pos);
    assert!(json.contains("\"answer\": 42"));
    assert!(json.contains("\"better\": 43"));
}

#[test]
fn scenario_4_dotted_key_then_header_conflict() {
    let r = parse("[fruit]\napple.color = \"red\"\napple.taste.sweet = true\n\n[fruit.apple]");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(
        r.errors()[0].message(),
        "fruit.apple previously defined at line 2, column 1"
    );
}

#[test]
fn scenario_5_duplicate_key() {
    let r = parse("foo = 1\nfoo = 2\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "foo previously defined at line 1, column 1");
}

#[test]
fn scenario_6_literal_array_then_array_table_header() {
    let r = parse("foo = [1]\n[[foo]]\nbar=2\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(
        r.errors()[0].message(),
        "foo previously defined as a literal array at line 1, column 1"
    );
}

#[test]
fn scenario_7_heterogeneous_array_below_v1() {
    let r = parse_with_version("foo = [ 1, 'bar' ]", TomlVersion::V0_5_0);
    assert_eq!(r.errors().len(), 1);
    assert_eq!(
        r.errors()[0].message(),
        "Cannot add a string to an array containing integers"
    );
}

#[test]
fn scenario_8_multiline_basic_strips_leading_newline() {
    let r = parse("foo = \"\"\"\n  foobar\"\"\"");
    assert!(!r.has_errors());
    assert_eq!(r.root().get_string("foo").unwrap(), Some("  foobar"));
}

#[test]
fn boundary_integer_extremes() {
    let r = parse(&format!("min = {}\nmax = {}\n", i64::MIN, i64::MAX));
    assert!(!r.has_errors());
    assert_eq!(r.root().get_long("min").unwrap(), Some(i64::MIN));
    assert_eq!(r.root().get_long("max").unwrap(), Some(i64::MAX));
}

#[test]
fn boundary_float_overflow_is_an_error() {
    let r = parse("big = 1E1000\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "Float is too large");
}

#[test]
fn boundary_float_underflow_is_an_error() {
    let r = parse("small = 1E-400\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "Float is too small");
}

#[test]
fn boundary_float_tiny_but_normal_is_accepted() {
    let r = parse("tiny = 1E-41\n");
    assert!(!r.has_errors());
    let value = r.root().get_double("tiny").unwrap().unwrap();
    assert!(value > 0.0 && value < 1e-30);
}

#[test]
fn boundary_integer_overflow_is_an_error() {
    let r = parse("huge = 99999999999999999999\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "Integer is too large");
}

#[test]
fn boundary_year_zero() {
    let r = parse("d = 0000-01-01\n");
    assert!(!r.has_errors());
    assert!(matches!(r.root().get("d"), Some(Value::LocalDate(_))));
}

#[test]
fn boundary_leap_year_feb_29() {
    let r = parse("d = 2000-02-29\n");
    assert!(!r.has_errors());
}

#[test]
fn boundary_non_leap_year_feb_29_rejected() {
    let r = parse("d = 1999-02-29\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "Invalid date 'FEBRUARY 29'");
}

#[test]
fn boundary_offset_exactly_18_hours_accepted() {
    let r = parse("d = 1979-05-27T07:32:00+18:00\n");
    assert!(!r.has_errors());
}

#[test]
fn boundary_offset_beyond_18_hours_rejected() {
    let r = parse("d = 1979-05-27T07:32:00+18:30\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "Invalid offset '+18:30'");
}

#[test]
fn boundary_leap_second_rejected() {
    let r = parse("d = 1979-05-27T07:32:60Z\n");
    assert_eq!(r.errors().len(), 1);
    assert_eq!(r.errors()[0].message(), "Invalid second '60'");
}

#[test]
fn boundary_astral_code_point_in_key_round_trips() {
    let r = parse("\"\u{1F600}\" = 1\n");
    assert!(!r.has_errors());
    assert_eq!(r.root().get_long("\u{1F600}").unwrap(), Some(1));
}

#[test]
fn boundary_astral_code_point_renders_as_big_u_escape_in_diagnostics() {
    let r = parse("foo = \u{1F600}\n");
    assert!(r.has_errors());
    assert!(r.errors()[0].message().contains("\\U0001F600"));
}
