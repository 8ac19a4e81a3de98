#![cfg(feature = "excel")]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use crate::error::ImportResult;
use crate::types::CellValue;

use super::{sheet_not_found, ColumnRef, GridSource, Workbook};

/// A workbook (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) opened with `calamine`.
///
/// Sheets are materialized on lookup; the first sheet is treated as active.
pub struct ExcelWorkbook {
    inner: Sheets<BufReader<File>>,
    names: Vec<String>,
}

impl std::fmt::Debug for ExcelWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcelWorkbook")
            .field("sheet_names", &self.names)
            .finish()
    }
}

impl ExcelWorkbook {
    /// Open a workbook, detecting the format from the file extension.
    pub fn open(path: impl AsRef<Path>) -> ImportResult<Self> {
        let inner = open_workbook_auto(path)?;
        let names = inner.sheet_names().to_vec();
        Ok(Self { inner, names })
    }

    fn load(&mut self, name: &str) -> ImportResult<ExcelSheet> {
        if !self.names.iter().any(|n| n == name) {
            return Err(sheet_not_found(name));
        }
        let range = self.inner.worksheet_range(name)?;
        Ok(ExcelSheet { range })
    }
}

impl Workbook for ExcelWorkbook {
    type Sheet<'a> = ExcelSheet;

    fn sheet_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn sheet_count(&self) -> usize {
        self.names.len()
    }

    fn sheet_by_name(&mut self, name: &str) -> ImportResult<ExcelSheet> {
        self.load(name)
    }

    fn sheet_by_index(&mut self, index: usize) -> ImportResult<ExcelSheet> {
        let name = self
            .names
            .get(index)
            .cloned()
            .ok_or_else(|| sheet_not_found(index))?;
        self.load(&name)
    }
}

/// One materialized worksheet.
#[derive(Debug, Clone)]
pub struct ExcelSheet {
    range: Range<Data>,
}

impl ExcelSheet {
    /// Wrap an already-loaded calamine range.
    pub fn from_range(range: Range<Data>) -> Self {
        Self { range }
    }
}

impl GridSource for ExcelSheet {
    // calamine positions are absolute and 0-based; the range may start after A1.
    fn highest_row(&self) -> usize {
        self.range.end().map(|(r, _)| r as usize + 1).unwrap_or(0)
    }

    fn highest_column(&self) -> Option<ColumnRef> {
        self.range.end().map(|(_, c)| ColumnRef(c as usize))
    }

    fn read_row(&self, row: usize, from: ColumnRef, to: ColumnRef) -> Vec<CellValue> {
        if row == 0 || to < from {
            return Vec::new();
        }
        let r = (row - 1) as u32;
        (from.0..=to.0)
            .map(|c| {
                self.range
                    .get_value((r, c as u32))
                    .map(convert_cell)
                    .unwrap_or(CellValue::Null)
            })
            .collect()
    }
}

fn convert_cell(c: &Data) -> CellValue {
    match c {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("{e:?}")),
    }
}
