use serde::Serialize;

use crate::types::SheetSelector;

/// Per-run tally of requested sheets.
///
/// `sheet_names` lists every requested selector in order; each one ends up in exactly one of
/// success (counted), `failed_sheet_names` or `skipped_sheet_names`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Total number of sheets in the workbook, requested or not.
    pub sheet_count: usize,
    /// Requested sheets imported without failure.
    pub success_count: usize,
    /// Requested selectors in processing order.
    pub sheet_names: Vec<SheetSelector>,
    /// Requested sheets whose failure was contained.
    pub failed_sheet_names: Vec<SheetSelector>,
    /// Requested sheets that did not exist and were skipped by an unknown-sheet handler.
    pub skipped_sheet_names: Vec<SheetSelector>,
}

impl ImportReport {
    /// True when every requested sheet that exists was imported without failure.
    pub fn is_success(&self) -> bool {
        self.failed_sheet_names.is_empty()
            && self.success_count + self.skipped_sheet_names.len() == self.sheet_names.len()
    }

    /// Number of requested sheets.
    pub fn requested_count(&self) -> usize {
        self.sheet_names.len()
    }
}

/// Result of [`super::Importer::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub report: ImportReport,
    /// Data records delivered to handlers across all successful sheets.
    pub records: usize,
}

impl ImportOutcome {
    /// Shorthand for `self.report.is_success()`.
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}
