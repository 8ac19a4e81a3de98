//! In-memory grid and workbook.

use crate::error::ImportResult;
use crate::types::{CellValue, SheetSelector};

use super::{sheet_not_found, ColumnRef, GridSource, Workbook};

/// A materialized sheet: a title plus row-major cell storage.
///
/// Rows may have different lengths; missing cells read as [`CellValue::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    title: String,
    rows: Vec<Vec<CellValue>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}

impl Grid {
    /// Create an empty grid with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Create a grid from row-major cells.
    pub fn from_rows(title: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    /// Sheet title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append one row.
    pub fn push_row<I, C>(&mut self, cells: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Append `n` rows without cells.
    pub fn push_blank_rows(&mut self, n: usize) {
        self.rows.extend(std::iter::repeat_with(Vec::new).take(n));
    }

    /// Builder form of [`Self::push_row`].
    pub fn with_row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CellValue>,
    {
        self.push_row(cells);
        self
    }

    /// Builder form of [`Self::push_blank_rows`].
    pub fn with_blank_rows(mut self, n: usize) -> Self {
        self.push_blank_rows(n);
        self
    }

    /// Row-major cell storage.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

impl GridSource for Grid {
    fn highest_row(&self) -> usize {
        self.rows.len()
    }

    fn highest_column(&self) -> Option<ColumnRef> {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .filter(|&w| w > 0)
            .map(|w| ColumnRef(w - 1))
    }

    fn read_row(&self, row: usize, from: ColumnRef, to: ColumnRef) -> Vec<CellValue> {
        if to < from {
            return Vec::new();
        }
        let cells = row
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        (from.0..=to.0)
            .map(|c| cells.get(c).cloned().unwrap_or(CellValue::Null))
            .collect()
    }
}

/// A single grid is a one-sheet workbook.
impl Workbook for Grid {
    type Sheet<'a> = &'a Grid;

    fn sheet_names(&self) -> Vec<String> {
        vec![self.title.clone()]
    }

    fn sheet_by_name(&mut self, name: &str) -> ImportResult<&Grid> {
        if name == self.title {
            Ok(self)
        } else {
            Err(sheet_not_found(name))
        }
    }

    fn sheet_by_index(&mut self, index: usize) -> ImportResult<&Grid> {
        if index == 0 {
            Ok(self)
        } else {
            Err(sheet_not_found(index))
        }
    }
}

/// Ordered, named in-memory sheets with an active-sheet index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<Grid>,
    active: usize,
}

impl MemoryWorkbook {
    /// Create a workbook from sheets; the first sheet is active.
    pub fn new(sheets: Vec<Grid>) -> Self {
        Self { sheets, active: 0 }
    }

    /// Append a sheet.
    pub fn with_sheet(mut self, sheet: Grid) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Make the sheet at `index` active.
    ///
    /// Fails with [`crate::ImportError::SheetNotFound`] when out of bounds.
    pub fn set_active(&mut self, index: usize) -> ImportResult<()> {
        if index >= self.sheets.len() {
            return Err(sheet_not_found(SheetSelector::Index(index)));
        }
        self.active = index;
        Ok(())
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[Grid] {
        &self.sheets
    }
}

impl Workbook for MemoryWorkbook {
    type Sheet<'a> = &'a Grid;

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.title.clone()).collect()
    }

    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn active_index(&self) -> usize {
        self.active
    }

    fn sheet_by_name(&mut self, name: &str) -> ImportResult<&Grid> {
        self.sheets
            .iter()
            .find(|s| s.title == name)
            .ok_or_else(|| sheet_not_found(name))
    }

    fn sheet_by_index(&mut self, index: usize) -> ImportResult<&Grid> {
        self.sheets.get(index).ok_or_else(|| sheet_not_found(index))
    }
}
