//! Capability contracts implemented by import handlers.

use crate::error::HandlerResult;
use crate::source::ColumnRef;
use crate::types::{HeadingMode, Record, SheetSelector};

use super::events::EventBus;
use super::report::ImportReport;

/// Consumes data records one at a time.
///
/// Closures of the shape `FnMut(Record) -> HandlerResult` implement this trait.
pub trait OnEachRow {
    /// Called once per data record, in row order. An error fails the sheet.
    fn on_row(&mut self, record: Record) -> HandlerResult;
}

impl<F> OnEachRow for F
where
    F: FnMut(Record) -> HandlerResult,
{
    fn on_row(&mut self, record: Record) -> HandlerResult {
        self(record)
    }
}

/// Receives all data records of a sheet at once, after the stream ends.
pub trait ToArray {
    /// Called once per sheet, also when the sheet has no data records.
    fn array(&mut self, records: Vec<Record>) -> HandlerResult;
}

/// Receives data records in blocks of [`ToBlocks::chunk_size`]; the last block may be shorter.
pub trait ToBlocks {
    /// Records per block. Zero is rejected with [`crate::ImportError::InvalidChunkSize`].
    fn chunk_size(&self) -> usize;

    /// Called with each full block, then once with the remainder if there is one.
    fn block(&mut self, records: Vec<Record>) -> HandlerResult;
}

/// Notified instead of failing when a requested sheet does not exist.
pub trait SkipsUnknownSheets {
    /// Called with the missing selector; the sheet is then reported as skipped.
    fn on_unknown_sheet(&mut self, sheet: &SheetSelector);
}

/// The consumption contract a sheet handler uses.
pub enum Consumer<'a> {
    EachRow(&'a mut dyn OnEachRow),
    Array(&'a mut dyn ToArray),
    Blocks(&'a mut dyn ToBlocks),
}

impl Consumer<'_> {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Consumer::EachRow(_) => "each_row",
            Consumer::Array(_) => "array",
            Consumer::Blocks(_) => "blocks",
        }
    }
}

/// Handler for a single sheet.
///
/// Only [`SheetImport::consumer`] is required. Every setting returning `Some` overrides the
/// corresponding [`super::ImportOptions`] field for this sheet.
///
/// ```rust
/// use rust_sheet_import::error::HandlerResult;
/// use rust_sheet_import::import::{Consumer, SheetImport, ToBlocks};
/// use rust_sheet_import::types::Record;
///
/// #[derive(Default)]
/// struct Batches(Vec<usize>);
///
/// impl ToBlocks for Batches {
///     fn chunk_size(&self) -> usize {
///         100
///     }
///
///     fn block(&mut self, records: Vec<Record>) -> HandlerResult {
///         self.0.push(records.len());
///         Ok(())
///     }
/// }
///
/// impl SheetImport for Batches {
///     fn consumer(&mut self) -> Consumer<'_> {
///         Consumer::Blocks(self)
///     }
///
///     fn start_row(&self) -> Option<usize> {
///         Some(3)
///     }
/// }
/// ```
pub trait SheetImport {
    /// How this handler receives records. Called once per sheet run.
    fn consumer(&mut self) -> Consumer<'_>;

    /// First row to read (1-based).
    fn start_row(&self) -> Option<usize> {
        None
    }

    /// Last row to read (1-based, inclusive).
    fn limit(&self) -> Option<usize> {
        None
    }

    /// Last column to read, inclusive.
    fn end_column(&self) -> Option<ColumnRef> {
        None
    }

    /// Heading policy for this sheet; `Some(HeadingMode::None)` suppresses the heading row.
    fn heading(&self) -> Option<HeadingMode> {
        None
    }

    /// Opt in to grouping same-named columns.
    fn grouped_headings(&self) -> bool {
        false
    }

    /// Heading formatter name.
    fn formatter(&self) -> Option<&str> {
        None
    }

    /// Unknown-sheet capability, consulted when this handler's sheet is missing in a multi-sheet run.
    fn unknown_sheets(&mut self) -> Option<&mut dyn SkipsUnknownSheets> {
        None
    }

    /// Listeners for a run driven directly by this handler.
    fn register_events(&self) -> EventBus {
        EventBus::default()
    }
}

/// Handler that maps several sheets to their own [`SheetImport`] handlers.
pub trait MultiSheetImport {
    /// Requested sheets in processing order.
    fn sheets(&mut self) -> Vec<(SheetSelector, Box<dyn SheetImport>)>;

    /// Unknown-sheet capability, consulted when a sheet handler has none of its own.
    fn unknown_sheets(&mut self) -> Option<&mut dyn SkipsUnknownSheets> {
        None
    }

    /// Receives the report once every sheet has been processed.
    fn report(&mut self, _report: &ImportReport) {}

    fn register_events(&self) -> EventBus {
        EventBus::default()
    }
}

/// A handler passed to [`super::Importer::run`].
pub enum Import<'a> {
    Single(&'a mut dyn SheetImport),
    Multiple(&'a mut dyn MultiSheetImport),
}

impl Import<'_> {
    pub(crate) fn register_events(&self) -> EventBus {
        match self {
            Import::Single(handler) => handler.register_events(),
            Import::Multiple(handler) => handler.register_events(),
        }
    }
}
