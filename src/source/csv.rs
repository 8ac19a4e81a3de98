//! Delimited-text source: loads every CSV line as a grid row.
//!
//! No header handling happens here; the heading row is derived later by the row stream like for any
//! other grid.

use std::path::Path;

use crate::error::ImportResult;
use crate::types::CellValue;

use super::memory::Grid;

/// Options for loading delimited text into a [`Grid`].
#[derive(Debug, Clone)]
pub struct CsvGridOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Parse numeric and `true`/`false` fields into [`CellValue::Number`] / [`CellValue::Bool`].
    ///
    /// Off by default so that values like `007` survive as text.
    pub infer_types: bool,
    /// Title given to the resulting grid.
    pub title: String,
}

impl Default for CsvGridOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_types: false,
            title: "Sheet1".to_string(),
        }
    }
}

/// Load a CSV file into a [`Grid`].
pub fn read_csv_grid(path: impl AsRef<Path>, options: &CsvGridOptions) -> ImportResult<Grid> {
    let mut rdr = builder(options).from_path(path)?;
    read_csv_grid_from_reader(&mut rdr, options)
}

/// Load CSV data from an existing reader into a [`Grid`].
///
/// The reader should be built with `has_headers(false)`, otherwise its first line is consumed by
/// the `csv` crate and never reaches the grid.
pub fn read_csv_grid_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    options: &CsvGridOptions,
) -> ImportResult<Grid> {
    let mut grid = Grid::new(options.title.clone());
    for result in rdr.records() {
        let record = result?;
        grid.push_row(record.iter().map(|raw| convert_field(raw, options.infer_types)));
    }
    Ok(grid)
}

/// Load CSV text held in memory into a [`Grid`].
pub fn read_csv_grid_from_str(input: &str, options: &CsvGridOptions) -> ImportResult<Grid> {
    let mut rdr = builder(options).from_reader(input.as_bytes());
    read_csv_grid_from_reader(&mut rdr, options)
}

fn builder(options: &CsvGridOptions) -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(false).flexible(true).delimiter(options.delimiter);
    b
}

fn convert_field(raw: &str, infer_types: bool) -> CellValue {
    if raw.is_empty() {
        return CellValue::Null;
    }
    if !infer_types {
        return CellValue::String(raw.to_owned());
    }

    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Number(i as f64);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Number(f);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => CellValue::String(raw.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_csv_grid_from_str, CsvGridOptions};
    use crate::source::{ColumnRef, GridSource};
    use crate::types::CellValue;

    #[test]
    fn keeps_every_line_including_the_heading() {
        let grid = read_csv_grid_from_str("id,name\n1,Ada\n", &CsvGridOptions::default()).unwrap();
        assert_eq!(grid.highest_row(), 2);
        assert_eq!(
            grid.read_row(1, ColumnRef(0), ColumnRef(1)),
            vec![CellValue::from("id"), CellValue::from("name")]
        );
        assert_eq!(grid.read_row(2, ColumnRef(0), ColumnRef(0)), vec![CellValue::from("1")]);
    }

    #[test]
    fn infers_numbers_and_bools_when_enabled() {
        let opts = CsvGridOptions {
            infer_types: true,
            ..Default::default()
        };
        let grid = read_csv_grid_from_str("007,2.5,TRUE,,x\n", &opts).unwrap();
        assert_eq!(
            grid.read_row(1, ColumnRef(0), ColumnRef(4)),
            vec![
                CellValue::Number(7.0),
                CellValue::Number(2.5),
                CellValue::Bool(true),
                CellValue::Null,
                CellValue::from("x"),
            ]
        );
    }

    #[test]
    fn ragged_lines_are_accepted() {
        let opts = CsvGridOptions {
            delimiter: b';',
            ..Default::default()
        };
        let grid = read_csv_grid_from_str("a;b;c\nd\n", &opts).unwrap();
        assert_eq!(grid.highest_column(), Some(ColumnRef(2)));
        assert_eq!(
            grid.read_row(2, ColumnRef(0), ColumnRef(2)),
            vec![CellValue::from("d"), CellValue::Null, CellValue::Null]
        );
    }
}
