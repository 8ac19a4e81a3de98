//! Row streaming: walks a bounded row range of a [`GridSource`], derives the heading, and emits one
//! keyed [`Record`] per non-blank row.
//!
//! Behavior per row, from `start_row` to `end_row`:
//!
//! - rows with no non-empty cell extend a blank run; more than [`EMPTY_RUN_LIMIT`] consecutive blank
//!   rows end the stream, shorter runs are skipped
//! - the first non-blank row becomes the heading row (unless [`HeadingMode::None`]) and is emitted as
//!   a [`RowKind::Heading`] record keyed by its own identifiers
//! - every later non-blank row is projected through the heading and emitted as [`RowKind::Data`]
//!
//! ```rust
//! use rust_sheet_import::heading::FormatterRegistry;
//! use rust_sheet_import::source::Grid;
//! use rust_sheet_import::stream::{stream_rows, RowKind, StreamOptions};
//!
//! # fn main() -> Result<(), rust_sheet_import::ImportError> {
//! let grid = Grid::default()
//!     .with_row(["Nome", "Preço Unitário"])
//!     .with_row(["Café".into(), rust_sheet_import::types::CellValue::Number(4.5)]);
//!
//! let mut data = Vec::new();
//! let heading = stream_rows(&grid, &StreamOptions::default(), &FormatterRegistry::new(), |kind, record| {
//!     if kind == RowKind::Data {
//!         data.push(record);
//!     }
//!     Ok(())
//! })?;
//!
//! assert_eq!(heading.unwrap().keys().collect::<Vec<_>>(), vec!["nome", "preco_unitario"]);
//! assert_eq!(data[0].value("preco_unitario").and_then(|v| v.as_f64()), Some(4.5));
//! # Ok(())
//! # }
//! ```

use tracing::{debug, trace};

use crate::error::{ImportError, ImportResult};
use crate::heading::{FormatterRegistry, HeadingFormatter};
use crate::source::{ColumnRef, GridSource};
use crate::types::{CellValue, HeadingEntry, HeadingMap, HeadingMode, Record};

/// Consecutive blank rows tolerated before the stream is considered finished.
pub const EMPTY_RUN_LIMIT: usize = 10;

/// Whether an emitted record came from the heading row or a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// The heading row, keyed by its own identifiers.
    Heading,
    /// A data row projected through the heading.
    Data,
}

/// Options controlling one streaming run.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// First row to read (1-based). Must be at least 1.
    pub start_row: usize,
    /// Last row to read (inclusive). Defaults to the source's highest row.
    pub end_row: Option<usize>,
    /// Last column to read (inclusive). Defaults to the source's highest column.
    pub end_column: Option<ColumnRef>,
    /// How the heading is obtained.
    pub heading: HeadingMode,
    /// Group same-key columns into a sequence instead of keeping only the first.
    pub grouped_headings: bool,
    /// Heading formatter name. `None` uses the registry default.
    pub formatter: Option<String>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            start_row: 1,
            end_row: None,
            end_column: None,
            heading: HeadingMode::Derive,
            grouped_headings: false,
            formatter: None,
        }
    }
}

/// Stream the rows of `source` into `on_record`.
///
/// Returns the captured [`HeadingMap`], or `None` when [`HeadingMode::None`] is used or no
/// non-blank row was found. An empty range is not an error: `on_record` is simply never called.
///
/// Errors:
/// - [`ImportError::InvalidRange`] when `start_row < 1` or an explicit `end_row` precedes it
/// - [`ImportError::FormatterNotFound`] / [`ImportError::NoDefaultFormatter`] when the heading
///   formatter cannot be resolved (checked before any row is read)
/// - whatever `on_record` returns, unchanged
pub fn stream_rows<S, F>(
    source: &S,
    options: &StreamOptions,
    registry: &FormatterRegistry,
    mut on_record: F,
) -> ImportResult<Option<HeadingMap>>
where
    S: GridSource + ?Sized,
    F: FnMut(RowKind, Record) -> ImportResult<()>,
{
    let start_row = options.start_row;
    if start_row < 1 {
        return Err(ImportError::InvalidRange {
            start_row,
            end_row: options.end_row,
            message: "start row must be at least 1".to_string(),
        });
    }
    if let Some(end_row) = options.end_row {
        if end_row < start_row {
            return Err(ImportError::InvalidRange {
                start_row,
                end_row: Some(end_row),
                message: "end row precedes start row".to_string(),
            });
        }
    }

    let formatter = match options.heading {
        HeadingMode::None => None,
        HeadingMode::Derive | HeadingMode::Custom(_) => {
            Some(registry.resolve(options.formatter.as_deref())?)
        }
    };

    let end_row = options.end_row.unwrap_or_else(|| source.highest_row());
    let Some(end_column) = options.end_column.or_else(|| source.highest_column()) else {
        debug!(start_row, "source has no columns; nothing to stream");
        return Ok(None);
    };
    debug!(start_row, end_row, end_column = %end_column, "streaming rows");

    let mut heading = match options.heading {
        HeadingMode::None => Some(positional_heading(end_column)),
        _ => None,
    };
    let mut blank_run = 0usize;
    let mut emitted = 0usize;

    for row in start_row..=end_row {
        let cells = source.read_row(row, ColumnRef(0), end_column);
        let non_empty = cells.iter().filter(|c| !c.is_empty()).count();

        if non_empty == 0 {
            blank_run += 1;
        } else {
            blank_run = 0;
        }

        if blank_run > EMPTY_RUN_LIMIT {
            debug!(row, blank_run, "blank-row limit exceeded; treating as end of data");
            break;
        }
        if blank_run > 0 {
            continue;
        }

        match &heading {
            Some(map) => {
                let record = map.project(row, &cells, options.grouped_headings);
                trace!(row, keys = record.len(), "data record");
                on_record(RowKind::Data, record)?;
            }
            None => {
                // Only reachable for Derive/Custom, where the formatter was resolved above.
                let Some(formatter) = formatter.as_deref() else {
                    break;
                };
                let (map, record) = derive_heading(
                    row,
                    &cells,
                    &options.heading,
                    formatter,
                    options.grouped_headings,
                );
                trace!(row, columns = map.len(), "heading record");
                heading = Some(map);
                on_record(RowKind::Heading, record)?;
            }
        }
        emitted += 1;
    }

    debug!(emitted, "stream finished");
    Ok(match options.heading {
        HeadingMode::None => None,
        _ => heading,
    })
}

fn derive_heading(
    row: usize,
    cells: &[CellValue],
    mode: &HeadingMode,
    formatter: &dyn HeadingFormatter,
    grouped: bool,
) -> (HeadingMap, Record) {
    let filled: Vec<(usize, &CellValue)> = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .collect();

    let entries: Vec<HeadingEntry> = match mode {
        HeadingMode::Custom(names) if names.len() == filled.len() => filled
            .iter()
            .zip(names)
            .map(|(&(column, _), name)| HeadingEntry {
                original: name.clone(),
                key: key_or_letters(formatter.format(name, column), column),
                column,
            })
            .collect(),
        HeadingMode::Custom(names) => {
            debug!(
                row,
                names = names.len(),
                columns = filled.len(),
                "custom heading count mismatch; using positional keys"
            );
            filled
                .iter()
                .enumerate()
                .map(|(pos, &(column, cell))| HeadingEntry {
                    original: cell.to_text(),
                    key: pos.to_string(),
                    column,
                })
                .collect()
        }
        HeadingMode::Derive | HeadingMode::None => filled
            .iter()
            .map(|&(column, cell)| {
                let original = cell.to_text();
                HeadingEntry {
                    key: key_or_letters(formatter.format(&original, column), column),
                    original,
                    column,
                }
            })
            .collect(),
    };

    let map = HeadingMap::new(entries);
    let record = map.project(row, cells, grouped);
    (map, record)
}

// A heading that sanitizes to nothing ("#", "漢字") is keyed by its column letters.
fn key_or_letters(key: String, column: usize) -> String {
    if key.is_empty() {
        ColumnRef(column).letters()
    } else {
        key
    }
}

fn positional_heading(end_column: ColumnRef) -> HeadingMap {
    HeadingMap::new(
        (0..=end_column.index())
            .map(|column| {
                let letters = ColumnRef(column).letters();
                HeadingEntry {
                    original: letters.clone(),
                    key: letters,
                    column,
                }
            })
            .collect(),
    )
}
