//! Import dispatch: drives the row stream into caller-supplied handlers.
//!
//! A handler picks one consumption contract through [`SheetImport::consumer`]:
//!
//! - [`OnEachRow`]: one call per data record
//! - [`ToArray`]: every data record at once, after the stream ends
//! - [`ToBlocks`]: fixed-size blocks plus a trailing partial block
//!
//! [`MultiSheetImport`] maps sheet selectors to per-sheet handlers. Missing sheets fail the run
//! unless a [`SkipsUnknownSheets`] capability is present. Handlers expose lifecycle listeners through
//! an [`EventBus`].

mod concerns;
mod events;
mod importer;
mod report;

pub use concerns::{
    Consumer, Import, MultiSheetImport, OnEachRow, SheetImport, SkipsUnknownSheets, ToArray,
    ToBlocks,
};
pub use events::{EventBus, EventKind, EventListener, ImportEvent};
pub use importer::{ImportOptions, Importer};
pub use report::{ImportOutcome, ImportReport};

use crate::types::SheetSelector;

/// Keep only the entries whose selector appears in `selected`, preserving their order.
///
/// Useful inside [`MultiSheetImport::sheets`] to restrict a fixed sheet mapping at runtime.
pub fn conditional_sheets<H>(
    all: Vec<(SheetSelector, H)>,
    selected: &[SheetSelector],
) -> Vec<(SheetSelector, H)> {
    all.into_iter()
        .filter(|(sheet, _)| selected.contains(sheet))
        .collect()
}
