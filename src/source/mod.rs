//! Read-only grid access consumed by the row stream and the importer.
//!
//! - [`GridSource`]: bounded row reads from one sheet
//! - [`Workbook`]: sheet lookup by name/index plus the active sheet
//!
//! Implementations provided here:
//! - [`memory`]: in-memory [`Grid`] and [`MemoryWorkbook`]
//! - [`csv`]: loads a delimited file into a [`Grid`]
//! - `excel` (requires the Cargo feature `excel`): workbooks opened with `calamine`

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod memory;

use std::fmt;

use crate::error::{ImportError, ImportResult};
use crate::types::{CellValue, SheetSelector};

pub use memory::{Grid, MemoryWorkbook};

/// 0-based column reference, convertible to and from spreadsheet letters (`A`, `B`, ..., `AA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ColumnRef(pub usize);

impl ColumnRef {
    /// Column at the given 0-based index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// 0-based index.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Parse spreadsheet column letters (case-insensitive). Returns `None` for empty or non-letter
    /// input.
    pub fn from_letters(letters: &str) -> Option<Self> {
        let letters = letters.trim();
        if letters.is_empty() {
            return None;
        }
        let mut n: usize = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            n = n.checked_mul(26)?.checked_add(digit)?;
        }
        Some(Self(n - 1))
    }

    /// Spreadsheet letters for this column: 0=A, 25=Z, 26=AA.
    pub fn letters(self) -> String {
        let mut result = String::new();
        let mut n = self.0;
        loop {
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        result
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

/// Bounded read access to one sheet of cell values.
///
/// Rows are 1-based; columns are 0-based [`ColumnRef`]s. Implementations must not be mutated by
/// reads.
pub trait GridSource {
    /// Highest populated row (1-based), or 0 for an empty sheet.
    fn highest_row(&self) -> usize;

    /// Highest populated column, or `None` for an empty sheet.
    fn highest_column(&self) -> Option<ColumnRef>;

    /// Read the cells of `row` from `from` to `to` (inclusive).
    ///
    /// The result always has `to - from + 1` cells; cells outside the populated area are
    /// [`CellValue::Null`].
    fn read_row(&self, row: usize, from: ColumnRef, to: ColumnRef) -> Vec<CellValue>;
}

impl<T: GridSource + ?Sized> GridSource for &T {
    fn highest_row(&self) -> usize {
        (**self).highest_row()
    }

    fn highest_column(&self) -> Option<ColumnRef> {
        (**self).highest_column()
    }

    fn read_row(&self, row: usize, from: ColumnRef, to: ColumnRef) -> Vec<CellValue> {
        (**self).read_row(row, from, to)
    }
}

/// A collection of named sheets.
pub trait Workbook {
    /// Sheet handle returned by lookups.
    type Sheet<'a>: GridSource
    where
        Self: 'a;

    /// Sheet titles in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Number of sheets.
    fn sheet_count(&self) -> usize {
        self.sheet_names().len()
    }

    /// 0-based index of the active sheet.
    fn active_index(&self) -> usize {
        0
    }

    /// Whether `selector` resolves to a sheet (name lookup or bounds-checked index).
    fn sheet_exists(&self, selector: &SheetSelector) -> bool {
        match selector {
            SheetSelector::Index(i) => *i < self.sheet_count(),
            SheetSelector::Name(name) => self.sheet_names().iter().any(|s| s == name),
        }
    }

    /// Look up a sheet by title.
    fn sheet_by_name(&mut self, name: &str) -> ImportResult<Self::Sheet<'_>>;

    /// Look up a sheet by 0-based index.
    fn sheet_by_index(&mut self, index: usize) -> ImportResult<Self::Sheet<'_>>;

    /// The active sheet.
    fn active_sheet(&mut self) -> ImportResult<Self::Sheet<'_>> {
        let index = self.active_index();
        self.sheet_by_index(index)
    }

    /// Look up a sheet by selector.
    fn sheet(&mut self, selector: &SheetSelector) -> ImportResult<Self::Sheet<'_>> {
        match selector {
            SheetSelector::Index(i) => self.sheet_by_index(*i),
            SheetSelector::Name(name) => self.sheet_by_name(name),
        }
    }
}

pub(crate) fn sheet_not_found(sheet: impl Into<SheetSelector>) -> ImportError {
    ImportError::SheetNotFound {
        sheet: sheet.into(),
    }
}
