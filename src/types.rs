//! Core data model types for row streaming.
//!
//! A grid source yields positional rows of [`CellValue`]s. The row stream turns them into keyed
//! [`Record`]s using a [`HeadingMap`] derived from (or supplied in place of) a heading row.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A single cell value read from a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing/empty cell.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any numeric cell (integers are stored as whole floats).
    Number(f64),
    /// Text.
    String(String),
}

impl CellValue {
    /// Whether the cell counts as empty for blank-row detection and heading derivation.
    ///
    /// Null, the empty string, and strings made only of whitespace or non-breaking spaces are empty.
    /// Numbers (including zero) and booleans never are.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.chars().all(|c| c.is_whitespace() || c == '\u{a0}'),
            CellValue::Bool(_) | CellValue::Number(_) => false,
        }
    }

    /// Text rendering used for heading cells.
    ///
    /// Whole numbers render without a fractional part (`3.0` becomes `"3"`).
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            CellValue::String(s) => s.clone(),
        }
    }

    /// Returns the string content, if this is a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a number cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

static NULL: CellValue = CellValue::Null;

/// The value stored under one key of a [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The value of a single column.
    Single(CellValue),
    /// Values of several columns sharing a key (grouped headings only).
    Group(Vec<CellValue>),
}

impl FieldValue {
    /// The first value under this key.
    pub fn first(&self) -> &CellValue {
        match self {
            FieldValue::Single(v) => v,
            FieldValue::Group(vs) => vs.first().unwrap_or(&NULL),
        }
    }

    /// All values under this key, in column order.
    pub fn values(&self) -> &[CellValue] {
        match self {
            FieldValue::Single(v) => std::slice::from_ref(v),
            FieldValue::Group(vs) => vs,
        }
    }

    // Turns a single value into a group on the first repeat.
    fn push(&mut self, value: CellValue) {
        match self {
            FieldValue::Group(values) => values.push(value),
            FieldValue::Single(first) => {
                let first = std::mem::replace(first, CellValue::Null);
                *self = FieldValue::Group(vec![first, value]);
            }
        }
    }
}

/// One row mapped from field identifier to value(s), in column order.
///
/// Records are produced once per streamed row and are not modified after emission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    row: usize,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record for the given 1-based source row.
    pub fn new(row: usize) -> Self {
        Self {
            row,
            fields: Vec::new(),
        }
    }

    /// The 1-based source row this record was read from.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Look up the value(s) stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up the first cell stored under `key`.
    pub fn value(&self, key: &str) -> Option<&CellValue> {
        self.get(key).map(FieldValue::first)
    }

    /// Iterate keys in column order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate `(key, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Assign `value` under `key`, resolving a key collision with the given policy.
    ///
    /// With `grouped == false` the first column for a key wins and later ones are dropped. With
    /// `grouped == true` a repeated key turns the stored value into a [`FieldValue::Group`] and
    /// appends.
    pub fn assign(&mut self, key: &str, value: CellValue, grouped: bool) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            None => self.fields.push((key.to_string(), FieldValue::Single(value))),
            Some(_) if !grouped => {}
            Some((_, slot)) => slot.push(value),
        }
    }

    /// Render the record as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(serde_json::Value::Null)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A single heading column: its original text, sanitized key, and 0-based column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Text as it appeared in the heading row (or the custom name that replaced it).
    pub original: String,
    /// Field identifier records use for this column.
    pub key: String,
    /// 0-based column index within the streamed row.
    pub column: usize,
}

/// Ordered list of heading entries with strictly increasing column indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct HeadingMap {
    entries: Vec<HeadingEntry>,
    // One slot per entry, resolved once so projecting a row never searches by key.
    #[serde(skip)]
    slots: Vec<Slot>,
    #[serde(skip)]
    field_count: usize,
}

/// Where an entry's cell lands in a projected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// First column carrying its key; opens a new field.
    First,
    /// Repeats the key of the field at this index.
    Repeat(usize),
}

impl HeadingMap {
    /// Create a heading map from entries.
    ///
    /// # Panics
    ///
    /// Panics if column indices are not strictly increasing.
    pub fn new(entries: Vec<HeadingEntry>) -> Self {
        assert!(
            entries.windows(2).all(|w| w[0].column < w[1].column),
            "heading columns must be strictly increasing"
        );

        let mut fields: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
        let slots = entries
            .iter()
            .map(|entry| match fields.get(entry.key.as_str()) {
                Some(&index) => Slot::Repeat(index),
                None => {
                    let next = fields.len();
                    fields.insert(entry.key.as_str(), next);
                    Slot::First
                }
            })
            .collect();
        let field_count = fields.len();

        Self {
            entries,
            slots,
            field_count,
        }
    }

    /// Entries in column order.
    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    /// Keys in column order (may contain duplicates).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Number of heading columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no heading columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a record from a positional row, reading each heading's column.
    ///
    /// Runs in time linear in the number of entries: key collisions were resolved in [`Self::new`].
    pub(crate) fn project(&self, row_number: usize, row: &[CellValue], grouped: bool) -> Record {
        let mut fields: Vec<(String, FieldValue)> = Vec::with_capacity(self.field_count);
        for (entry, slot) in self.entries.iter().zip(&self.slots) {
            let cell = || row.get(entry.column).cloned().unwrap_or(CellValue::Null);
            match *slot {
                Slot::First => fields.push((entry.key.clone(), FieldValue::Single(cell()))),
                Slot::Repeat(index) if grouped => fields[index].1.push(cell()),
                Slot::Repeat(_) => {}
            }
        }
        Record {
            row: row_number,
            fields,
        }
    }

    /// Number of distinct keys, i.e. the field count of every record projected in first-wins mode.
    pub fn distinct_keys(&self) -> usize {
        self.field_count
    }
}

/// How the heading of a streamed range is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeadingMode {
    /// The first non-blank row is the heading row.
    #[default]
    Derive,
    /// No heading row; records are keyed by column letters.
    None,
    /// The first non-blank row is the heading row, but its texts are replaced by these names.
    Custom(Vec<String>),
}

/// Selects a sheet by 0-based index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// 0-based position in the workbook.
    Index(usize),
    /// Sheet title.
    Name(String),
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{i}"),
            SheetSelector::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<&str> for SheetSelector {
    fn from(value: &str) -> Self {
        SheetSelector::Name(value.to_string())
    }
}

impl From<String> for SheetSelector {
    fn from(value: String) -> Self {
        SheetSelector::Name(value)
    }
}

impl From<usize> for SheetSelector {
    fn from(value: usize) -> Self {
        SheetSelector::Index(value)
    }
}
