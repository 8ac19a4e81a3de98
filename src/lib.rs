//! `rust-sheet-import` turns spreadsheet grids into keyed records and routes them to import
//! handlers.
//!
//! A sheet is any [`source::GridSource`]: an in-memory [`source::Grid`], a CSV file loaded with
//! [`source::csv`], or (with the Cargo feature `excel`) a workbook sheet read through `calamine`.
//!
//! ## Pipeline
//!
//! 1. [`stream::stream_rows`] walks a bounded row range. The first non-blank row becomes the
//!    heading; every later non-blank row becomes a [`types::Record`] keyed by the sanitized heading
//!    identifiers. More than [`stream::EMPTY_RUN_LIMIT`] consecutive blank rows end the data.
//! 2. Heading texts are turned into identifiers by a named formatter from a
//!    [`heading::FormatterRegistry`] (`ascii` by default: `"Preço Unitário"` → `preco_unitario`).
//! 3. [`import::Importer`] feeds the records to a handler that consumes them one by one, as one
//!    array, or in fixed-size blocks, across one or many sheets, with lifecycle events and
//!    per-sheet failure containment.
//!
//! ## Quick example: read a CSV export
//!
//! ```rust
//! use rust_sheet_import::heading::FormatterRegistry;
//! use rust_sheet_import::read::read_into_array;
//! use rust_sheet_import::source::csv::{read_csv_grid_from_str, CsvGridOptions};
//! use rust_sheet_import::stream::StreamOptions;
//!
//! # fn main() -> Result<(), rust_sheet_import::ImportError> {
//! let csv = "Nome Completo,E-mail\nAda Lovelace,ada@example.com\n\nGrace Hopper,grace@example.com\n";
//! let grid = read_csv_grid_from_str(csv, &CsvGridOptions::default())?;
//!
//! let data = read_into_array(&grid, &StreamOptions::default(), &FormatterRegistry::new())?;
//! assert_eq!(data.rows.len(), 2);
//! assert_eq!(
//!     data.rows[1].value("email").and_then(|v| v.as_str()),
//!     Some("grace@example.com")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`source`]: grid and workbook access plus the provided sources
//! - [`heading`]: heading identifier formatters and their registry
//! - [`stream`]: the row streaming engine
//! - [`import`]: handler contracts, the importer, events and reports
//! - [`read`]: handler-free readers
//! - [`types`]: cell values, records and heading maps
//! - [`error`]: error types used across the crate

pub mod error;
pub mod heading;
pub mod import;
pub mod read;
pub mod source;
pub mod stream;
pub mod types;

pub use error::{ImportError, ImportResult};
