//! The tree builder: enforces TOML's table-definition rules.
//!
//! Implements the operations named in spec.md §4.3 (`set_value`,
//! `define_table`, `define_array_table`, `define_dotted`) against the
//! `NodeState` enum (here [`TableState`]) from the Design Notes. `set_value`
//! and `define_dotted` resolve to the same underlying mechanic — creating
//! `DottedIntermediate` tables along a multi-segment path — since spec.md
//! describes the same behavior from two call sites (a plain dotted
//! assignment vs. a member of an inline-table literal); both are
//! implemented by [`assign_dotted`], recorded in DESIGN.md.

use std::borrow::Cow;

use crate::{
    array::ArrayKind,
    error::ParseError,
    table::TableState,
    Array, Position, Table, Value,
};

fn push_path(path_so_far: &mut String, segment: &str) {
    if !path_so_far.is_empty() {
        path_so_far.push('.');
    }
    path_so_far.push_str(segment);
}

/// Walk `segments` from `table`, creating intermediates in `intermediate_state`
/// as needed, and bind `value` at the final segment. Used both for top-level
/// dotted-key assignments and for populating the contents of an inline-table
/// literal (on its own scratch root, before it is sealed).
pub(crate) fn assign_dotted<'a>(
    table: &mut Table<'a>,
    segments: &[Cow<'a, str>],
    value: Value<'a>,
    pos: Position,
    intermediate_state: TableState,
) -> Result<(), ParseError> {
    let (last, init) = segments
        .split_last()
        .ok_or_else(|| ParseError::new(pos, "Empty table key"))?;

    let mut current = table;
    let mut path_so_far = String::new();
    for seg in init {
        push_path(&mut path_so_far, seg);
        if current.seal_blocks_dotted_key() {
            return Err(ParseError::new(
                pos,
                format!("{path_so_far} previously defined at {}", current.position),
            ));
        }
        if !current.contains_key(seg.as_ref()) {
            current.insert_new(
                seg.clone(),
                Value::Table(Table::with_state(intermediate_state, pos)),
                pos,
            );
        }
        current = match current.get_mut(seg.as_ref()) {
            Some(Value::Table(t)) => t,
            _ => {
                return Err(ParseError::new(
                    pos,
                    format!("{path_so_far} is not a table"),
                ))
            }
        };
    }

    push_path(&mut path_so_far, last);
    if current.seal_blocks_dotted_key() {
        return Err(ParseError::new(
            pos,
            format!("{path_so_far} previously defined at {}", current.position),
        ));
    }
    if let Some(existing) = current.position_of(last) {
        return Err(ParseError::new(
            pos,
            format!("{path_so_far} previously defined at {existing}"),
        ));
    }
    current.insert_new(last.clone(), value, pos);
    Ok(())
}

/// Descend one key segment for a `[header]`/`[[header]]` walk, creating an
/// `Implicit` table if the segment is absent. If the segment addresses a
/// table-array, descends into its currently-open (last) element, per
/// spec.md §4.3's "implicit index" rule.
fn step_implicit<'t, 'a>(
    table: &'t mut Table<'a>,
    seg: &Cow<'a, str>,
    pos: Position,
    path_so_far: &str,
) -> Result<&'t mut Table<'a>, ParseError> {
    if table.seal_blocks_header() {
        return Err(ParseError::new(
            pos,
            format!("{path_so_far} previously defined at {}", table.position),
        ));
    }
    if !table.contains_key(seg.as_ref()) {
        table.insert_new(
            seg.clone(),
            Value::Table(Table::with_state(TableState::Implicit, pos)),
            pos,
        );
    }
    match table.get_mut(seg.as_ref()) {
        Some(Value::Table(_)) => match table.get_mut(seg.as_ref()) {
            Some(Value::Table(t)) => Ok(t),
            _ => unreachable!(),
        },
        Some(Value::Array(arr)) => arr
            .current_table_mut()
            .ok_or_else(|| ParseError::new(pos, format!("{path_so_far} is not a table"))),
        _ => Err(ParseError::new(pos, format!("{path_so_far} is not a table"))),
    }
}

/// Incrementally grows a root [`Table`] while parsing a document.
#[derive(Debug)]
pub(crate) struct TreeBuilder<'a> {
    root: Table<'a>,
    current_path: Vec<Cow<'a, str>>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new() -> Self {
        Self {
            root: Table::with_state(TableState::Root, Position::start()),
            current_path: Vec::new(),
        }
    }

    pub(crate) fn into_root(self) -> Table<'a> {
        self.root
    }

    fn resolve_current(&mut self) -> &mut Table<'a> {
        let mut current = &mut self.root;
        for seg in &self.current_path {
            current = match current.get_mut(seg.as_ref()) {
                Some(Value::Table(t)) => t,
                Some(Value::Array(arr)) => arr
                    .current_table_mut()
                    .expect("current_path segment must resolve to a table"),
                _ => unreachable!("current_path must always resolve to a table chain"),
            };
        }
        current
    }

    /// `key = value`, possibly dotted, relative to the table currently open
    /// via the last `[header]`/`[[header]]`.
    pub(crate) fn set_value(
        &mut self,
        key_path: &[Cow<'a, str>],
        value: Value<'a>,
        pos: Position,
    ) -> Result<(), ParseError> {
        let current = self.resolve_current();
        assign_dotted(current, key_path, value, pos, TableState::DottedIntermediate)
    }

    /// `[path]`.
    pub(crate) fn define_table(
        &mut self,
        path: &[Cow<'a, str>],
        pos: Position,
    ) -> Result<(), ParseError> {
        let (last, init) = path
            .split_last()
            .ok_or_else(|| ParseError::new(pos, "Empty table key"))?;

        let mut current = &mut self.root;
        let mut path_so_far = String::new();
        for seg in init {
            push_path(&mut path_so_far, seg);
            current = step_implicit(current, seg, pos, &path_so_far)?;
        }
        push_path(&mut path_so_far, last);

        if current.seal_blocks_header() {
            return Err(ParseError::new(
                pos,
                format!("{path_so_far} previously defined at {}", current.position),
            ));
        }
        match current.get_mut(last.as_ref()) {
            None => {
                current.insert_new(
                    last.clone(),
                    Value::Table(Table::with_state(TableState::ExplicitHeader, pos)),
                    pos,
                );
            }
            Some(Value::Table(t)) if t.is_implicitly_defined() => {
                t.promote_to_explicit(pos);
            }
            Some(Value::Table(t)) => {
                return Err(ParseError::new(
                    pos,
                    format!("{path_so_far} previously defined at {}", t.position),
                ));
            }
            Some(_) => {
                let existing = current.position_of(last).expect("key was just matched");
                return Err(ParseError::new(
                    pos,
                    format!("{path_so_far} previously defined at {existing}"),
                ));
            }
        }

        self.current_path = path.to_vec();
        Ok(())
    }

    /// `[[path]]`.
    pub(crate) fn define_array_table(
        &mut self,
        path: &[Cow<'a, str>],
        pos: Position,
    ) -> Result<(), ParseError> {
        let (last, init) = path
            .split_last()
            .ok_or_else(|| ParseError::new(pos, "Empty table key"))?;

        let mut current = &mut self.root;
        let mut path_so_far = String::new();
        for seg in init {
            push_path(&mut path_so_far, seg);
            current = step_implicit(current, seg, pos, &path_so_far)?;
        }
        push_path(&mut path_so_far, last);

        match current.get_mut(last.as_ref()) {
            None => {
                let mut arr = Array::new_table_array();
                arr.push(Value::Table(Table::with_state(
                    TableState::ArrayTableElement,
                    pos,
                )));
                current.insert_new(last.clone(), Value::Array(arr), pos);
            }
            Some(Value::Array(arr)) if arr.kind() == ArrayKind::TableArray => {
                arr.push(Value::Table(Table::with_state(
                    TableState::ArrayTableElement,
                    pos,
                )));
            }
            Some(Value::Array(_)) => {
                let existing = current.position_of(last).expect("key was just matched");
                return Err(ParseError::new(
                    pos,
                    format!("{path_so_far} previously defined as a literal array at {existing}"),
                ));
            }
            Some(_) => {
                let existing = current.position_of(last).expect("key was just matched");
                return Err(ParseError::new(
                    pos,
                    format!("{path_so_far} is not an array (previously defined at {existing})"),
                ));
            }
        }

        self.current_path = path.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(s: &str) -> Cow<'_, str> {
        Cow::Borrowed(s)
    }

    #[test]
    fn redefining_a_header_table_errors() {
        let mut b = TreeBuilder::new();
        b.define_table(&[seg("a")], Position { line: 1, column: 1 })
            .unwrap();
        let err = b
            .define_table(&[seg("a")], Position { line: 2, column: 1 })
            .unwrap_err();
        assert!(err.message().contains("previously defined at line 1, column 1"));
    }

    #[test]
    fn dotted_path_seals_against_later_header() {
        let mut b = TreeBuilder::new();
        b.define_table(&[seg("fruit")], Position { line: 1, column: 1 })
            .unwrap();
        b.set_value(
            &[seg("apple"), seg("color")],
            Value::String("red".into()),
            Position { line: 2, column: 1 },
        )
        .unwrap();
        let err = b
            .define_table(&[seg("fruit"), seg("apple")], Position { line: 5, column: 1 })
            .unwrap_err();
        assert_eq!(
            err.message(),
            "fruit.apple previously defined at line 2, column 1"
        );
    }

    #[test]
    fn literal_array_rejects_array_table_header() {
        let mut b = TreeBuilder::new();
        b.set_value(
            &[seg("foo")],
            Value::Array(core::iter::once(Value::Integer(1)).collect()),
            Position { line: 1, column: 1 },
        )
        .unwrap();
        let err = b
            .define_array_table(&[seg("foo")], Position { line: 2, column: 1 })
            .unwrap_err();
        assert_eq!(
            err.message(),
            "foo previously defined as a literal array at line 1, column 1"
        );
    }
}
