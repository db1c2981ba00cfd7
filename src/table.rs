//! A TOML table: an ordered, key-indexed map of values.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::{
    datetime::{LocalDate, LocalDateTime, LocalTime, OffsetDateTime},
    error::Error,
    key::split_key,
    Array, Position, Value,
};

/// How a [`Table`] node came to exist, per spec.md §3/§9.
///
/// Replaces a set of independent booleans (`explicitly_defined`,
/// `implicitly_defined`, `inline`, `from_dotted_key`) with a closed set of
/// states and the promotions permitted between them, per the teacher's
/// Design Notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableState {
    /// The document root. Never redefined, never sealed.
    Root,
    /// Created as an intermediate table-header path segment that has not
    /// (yet) had its own `[header]` line. May be promoted to
    /// [`TableState::ExplicitHeader`] exactly once.
    Implicit,
    /// Introduced by `[header]`/`[[header]]`, or promoted from
    /// [`TableState::Implicit`]. Cannot be redefined or promoted again.
    ExplicitHeader,
    /// Created while walking a dotted key in an assignment. Sealed against
    /// later `[header]` addressing (invariant 3), but further dotted keys
    /// may still extend it (invariant 5).
    DottedIntermediate,
    /// Created from a `{ … }` inline-table literal. Permanently sealed
    /// against any addition from outside the literal, by header or by
    /// dotted key.
    InlineLiteral,
    /// An element of a table-array, created by `[[header]]`. Cannot be
    /// redefined directly; nested headers resolve relative to whichever
    /// element is the array's current (last) one.
    ArrayTableElement,
}

impl TableState {
    fn sealed_against_headers(self) -> bool {
        matches!(
            self,
            TableState::DottedIntermediate | TableState::InlineLiteral
        )
    }

    fn sealed_against_dotted_keys(self) -> bool {
        matches!(self, TableState::InlineLiteral)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TableEntry<'a> {
    pub(crate) key: Cow<'a, str>,
    pub(crate) value: Value<'a>,
    pub(crate) position: Position,
}

/// A TOML table.
///
/// Iteration order matches source-appearance order (invariant 6). Each entry
/// remembers the source position of its defining token, which redefinition
/// diagnostics cite.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    pub(crate) entries: Vec<TableEntry<'a>>,
    pub(crate) index: HashMap<Cow<'a, str>, usize>,
    pub(crate) state: TableState,
    pub(crate) position: Position,
}

impl<'a> Table<'a> {
    /// Create a new, empty table (in inline-literal state, since that's the
    /// only way user code outside the parser ever constructs one).
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            state: TableState::InlineLiteral,
            position: Position::start(),
        }
    }

    pub(crate) fn with_state(state: TableState, position: Position) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            state,
            position,
        }
    }

    /// The number of direct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a single key segment (not a dotted path).
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.index.get(key).map(|&i| &self.entries[i].value)
    }

    /// The source position of the entry's defining token, if present.
    pub fn position_of(&self, key: &str) -> Option<Position> {
        self.index.get(key).map(|&i| self.entries[i].position)
    }

    /// Whether a `[header]` introduced this table directly, or a promotion
    /// from an implicit intermediate did.
    pub fn is_explicitly_defined(&self) -> bool {
        matches!(
            self.state,
            TableState::ExplicitHeader | TableState::ArrayTableElement | TableState::Root
        )
    }

    /// Whether this table exists only as an undeclared intermediate.
    pub fn is_implicitly_defined(&self) -> bool {
        matches!(self.state, TableState::Implicit)
    }

    /// Whether this table came from a `{ … }` literal.
    pub fn is_inline(&self) -> bool {
        matches!(self.state, TableState::InlineLiteral)
    }

    /// Whether this table was created by a dotted key in an assignment.
    pub fn is_from_dotted_key(&self) -> bool {
        matches!(self.state, TableState::DottedIntermediate)
    }

    /// Iterate over the table's entries in source-appearance order.
    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Look up a value at `path`, parsing it with the key micro-grammar
    /// first.
    pub fn get_path(&self, path: &str) -> Result<Option<&Value<'a>>, Error> {
        let segments = split_key(path).map_err(Error::InvalidKey)?;
        Ok(self.navigate(&segments))
    }

    /// Look up a value at an already-split key sequence.
    pub fn get_path_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value<'a>> {
        self.navigate(segments)
    }

    fn navigate<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value<'a>> {
        let (last, init) = segments.split_last()?;
        let mut current = self;
        for seg in init {
            match current.get(seg.as_ref()) {
                Some(Value::Table(t)) => current = t,
                _ => return None,
            }
        }
        current.get(last.as_ref())
    }

    /// Resolve `path` and require it to be a string.
    pub fn get_string(&self, path: &str) -> Result<Option<&str>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_ref())),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "string",
            }),
        }
    }

    /// Resolve `path` and require it to be an integer.
    pub fn get_long(&self, path: &str) -> Result<Option<i64>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "integer",
            }),
        }
    }

    /// Resolve `path` and require it to be a float.
    pub fn get_double(&self, path: &str) -> Result<Option<f64>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::Float(f)) => Ok(Some(*f)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "float",
            }),
        }
    }

    /// Resolve `path` and require it to be a boolean.
    pub fn get_boolean(&self, path: &str) -> Result<Option<bool>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::Boolean(b)) => Ok(Some(*b)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "boolean",
            }),
        }
    }

    /// Resolve `path` and require it to be an array.
    pub fn get_array(&self, path: &str) -> Result<Option<&Array<'a>>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::Array(a)) => Ok(Some(a)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "array",
            }),
        }
    }

    /// Resolve `path` and require it to be a table.
    pub fn get_table(&self, path: &str) -> Result<Option<&Table<'a>>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::Table(t)) => Ok(Some(t)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "table",
            }),
        }
    }

    /// Resolve `path` and require it to be an offset date-time.
    pub fn get_offset_datetime(&self, path: &str) -> Result<Option<OffsetDateTime>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::OffsetDateTime(dt)) => Ok(Some(*dt)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "offset date-time",
            }),
        }
    }

    /// Resolve `path` and require it to be a local date-time.
    pub fn get_local_datetime(&self, path: &str) -> Result<Option<LocalDateTime>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::LocalDateTime(dt)) => Ok(Some(*dt)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "local date-time",
            }),
        }
    }

    /// Resolve `path` and require it to be a local date.
    pub fn get_local_date(&self, path: &str) -> Result<Option<LocalDate>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::LocalDate(d)) => Ok(Some(*d)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "local date",
            }),
        }
    }

    /// Resolve `path` and require it to be a local time.
    pub fn get_local_time(&self, path: &str) -> Result<Option<LocalTime>, Error> {
        match self.get_path(path)? {
            None => Ok(None),
            Some(Value::LocalTime(t)) => Ok(Some(*t)),
            Some(other) => Err(Error::Convert {
                from: other.kind_name(),
                to: "local time",
            }),
        }
    }

    // --- tree-builder-internal primitives ---

    pub(crate) fn state(&self) -> TableState {
        self.state
    }

    pub(crate) fn seal_blocks_header(&self) -> bool {
        self.state.sealed_against_headers()
    }

    pub(crate) fn seal_blocks_dotted_key(&self) -> bool {
        self.state.sealed_against_dotted_keys()
    }

    pub(crate) fn promote_to_explicit(&mut self, position: Position) {
        self.state = TableState::ExplicitHeader;
        self.position = position;
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Value<'a>> {
        self.index.get(key).map(|&i| &mut self.entries[i].value)
    }

    /// Insert a brand-new key (caller must have already checked for
    /// collisions); returns an error only as a defensive invariant check.
    pub(crate) fn insert_new(&mut self, key: Cow<'a, str>, value: Value<'a>, position: Position) {
        debug_assert!(!self.index.contains_key(&key));
        let idx = self.entries.len();
        self.index.insert(key.clone(), idx);
        self.entries.push(TableEntry {
            key,
            value,
            position,
        });
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }
}

impl Default for Table<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FromIterator<(Cow<'a, str>, Value<'a>)> for Table<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Cow<'a, str>, Value<'a>)>,
    {
        let mut table = Table::new();
        for (key, value) in iter {
            table.insert_new(key, value, Position::start());
        }
        table
    }
}

/// An iterator over a [`Table`]'s key-value pairs, in source-appearance
/// order.
#[derive(Debug)]
pub struct Iter<'t, 'a> {
    inner: std::slice::Iter<'t, TableEntry<'a>>,
}

impl<'t, 'a> Iterator for Iter<'t, 'a> {
    type Item = (&'t str, &'t Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (e.key.as_ref(), &e.value))
    }
}
