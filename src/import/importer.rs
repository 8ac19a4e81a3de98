use std::mem;

use tracing::{debug, error, info, warn};

use crate::error::{ImportError, ImportResult, ImportSeverity};
use crate::heading::FormatterRegistry;
use crate::source::{ColumnRef, Workbook};
use crate::stream::{stream_rows, RowKind, StreamOptions};
use crate::types::{HeadingMode, SheetSelector};

use super::concerns::{Consumer, Import, MultiSheetImport, SheetImport};
use super::events::{EventBus, ImportEvent};
use super::report::{ImportOutcome, ImportReport};

/// Options controlling an import run.
///
/// Use [`Default`] for common cases. Settings declared by a sheet handler take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// First row to read (1-based).
    pub start_row: usize,
    /// Last row to read; `None` reads to the sheet's highest row.
    pub end_row: Option<usize>,
    /// Last column to read; `None` reads to the sheet's highest column.
    pub end_column: Option<ColumnRef>,
    /// How the heading row is found and turned into record keys.
    pub heading: HeadingMode,
    /// Group same-named columns instead of keeping the first one.
    pub grouped_headings: bool,
    /// Propagate the first sheet failure instead of containing it at the sheet boundary.
    pub throw_on_error: bool,
    /// Target of a single-sheet run; `None` selects the active sheet.
    pub sheet: Option<SheetSelector>,
    /// Heading formatter name; `None` uses the registry default.
    pub formatter: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            start_row: 1,
            end_row: None,
            end_column: None,
            heading: HeadingMode::Derive,
            grouped_headings: false,
            throw_on_error: true,
            sheet: None,
            formatter: None,
        }
    }
}

/// Drives the row stream into import handlers.
///
/// An `Importer` is configured once and can run any number of imports.
///
/// ```rust
/// use rust_sheet_import::error::HandlerResult;
/// use rust_sheet_import::import::{Consumer, ImportOptions, Importer, SheetImport, ToArray};
/// use rust_sheet_import::source::{Grid, MemoryWorkbook};
/// use rust_sheet_import::types::Record;
///
/// #[derive(Default)]
/// struct Collect(Vec<Record>);
///
/// impl ToArray for Collect {
///     fn array(&mut self, records: Vec<Record>) -> HandlerResult {
///         self.0 = records;
///         Ok(())
///     }
/// }
///
/// impl SheetImport for Collect {
///     fn consumer(&mut self) -> Consumer<'_> {
///         Consumer::Array(self)
///     }
/// }
///
/// # fn main() -> Result<(), rust_sheet_import::ImportError> {
/// let mut workbook = MemoryWorkbook::default().with_sheet(
///     Grid::new("People")
///         .with_row(["Name", "Age"])
///         .with_row(["Ada".into(), rust_sheet_import::types::CellValue::Number(36.0)]),
/// );
///
/// let mut handler = Collect::default();
/// let outcome = Importer::new(ImportOptions::default()).run_sheet(&mut workbook, &mut handler)?;
///
/// assert!(outcome.is_success());
/// assert_eq!(handler.0[0].value("name").and_then(|v| v.as_str()), Some("Ada"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Importer {
    options: ImportOptions,
    registry: FormatterRegistry,
}

impl Importer {
    /// Importer using the default formatter registry.
    pub fn new(options: ImportOptions) -> Self {
        Self::with_registry(options, FormatterRegistry::new())
    }

    /// Importer using an explicit formatter registry.
    pub fn with_registry(options: ImportOptions, registry: FormatterRegistry) -> Self {
        Self { options, registry }
    }

    /// Options this importer was built with.
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Formatters available to heading derivation.
    pub fn registry(&self) -> &FormatterRegistry {
        &self.registry
    }

    /// Run a single-sheet handler. See [`Self::run`].
    pub fn run_sheet<W: Workbook>(
        &self,
        workbook: &mut W,
        handler: &mut dyn SheetImport,
    ) -> ImportResult<ImportOutcome> {
        self.run(workbook, Import::Single(handler))
    }

    /// Run a multi-sheet handler. See [`Self::run`].
    pub fn run_sheets<W: Workbook>(
        &self,
        workbook: &mut W,
        handler: &mut dyn MultiSheetImport,
    ) -> ImportResult<ImportOutcome> {
        self.run(workbook, Import::Multiple(handler))
    }

    /// Import `workbook` into `import`.
    ///
    /// The handler's listeners receive `BeforeImport` first and `AfterImport` last. Multi-sheet
    /// runs also emit `BeforeSheet`/`AfterSheet` around every existing sheet.
    ///
    /// Sheet failures that are [recoverable](ImportError::is_recoverable) are contained when
    /// `throw_on_error` is off: an `ImportFailed` event is emitted, the sheet is reported as failed
    /// and the run continues. Anything else propagates and aborts the run.
    pub fn run<W: Workbook>(
        &self,
        workbook: &mut W,
        import: Import<'_>,
    ) -> ImportResult<ImportOutcome> {
        let events = import.register_events();
        events.emit(&ImportEvent::BeforeImport);

        let outcome = match import {
            Import::Single(handler) => self.import_single(workbook, handler, &events)?,
            Import::Multiple(handler) => self.import_multiple(workbook, handler, &events)?,
        };

        info!(
            requested = outcome.report.requested_count(),
            succeeded = outcome.report.success_count,
            failed = outcome.report.failed_sheet_names.len(),
            skipped = outcome.report.skipped_sheet_names.len(),
            records = outcome.records,
            "import finished"
        );
        events.emit(&ImportEvent::AfterImport {
            report: &outcome.report,
        });
        Ok(outcome)
    }

    fn import_single<W: Workbook>(
        &self,
        workbook: &mut W,
        handler: &mut dyn SheetImport,
        events: &EventBus,
    ) -> ImportResult<ImportOutcome> {
        let selector = self
            .options
            .sheet
            .clone()
            .unwrap_or_else(|| SheetSelector::Index(workbook.active_index()));

        let mut report = ImportReport {
            sheet_count: workbook.sheet_count(),
            sheet_names: vec![selector.clone()],
            ..Default::default()
        };
        let mut records = 0;
        match self.import_sheet(workbook, &selector, handler, events)? {
            Some(n) => {
                report.success_count = 1;
                records = n;
            }
            None => report.failed_sheet_names.push(selector),
        }
        Ok(ImportOutcome { report, records })
    }

    fn import_multiple<W: Workbook>(
        &self,
        workbook: &mut W,
        multi: &mut dyn MultiSheetImport,
        events: &EventBus,
    ) -> ImportResult<ImportOutcome> {
        let entries = multi.sheets();
        let mut report = ImportReport {
            sheet_count: workbook.sheet_count(),
            sheet_names: entries.iter().map(|(sheet, _)| sheet.clone()).collect(),
            ..Default::default()
        };
        let mut records = 0;

        for (sheet, mut handler) in entries {
            if !workbook.sheet_exists(&sheet) {
                if let Some(skip) = handler.unknown_sheets() {
                    skip.on_unknown_sheet(&sheet);
                } else if let Some(skip) = multi.unknown_sheets() {
                    skip.on_unknown_sheet(&sheet);
                } else {
                    return Err(ImportError::SheetNotFound { sheet });
                }
                warn!(sheet = %sheet, "skipping unknown sheet");
                report.skipped_sheet_names.push(sheet);
                continue;
            }

            events.emit(&ImportEvent::BeforeSheet { sheet: &sheet });
            let result = self.import_sheet(workbook, &sheet, handler.as_mut(), events)?;
            let succeeded = result.is_some();
            events.emit(&ImportEvent::AfterSheet {
                sheet: &sheet,
                succeeded,
            });

            match result {
                Some(n) => {
                    report.success_count += 1;
                    records += n;
                }
                None => report.failed_sheet_names.push(sheet),
            }
        }

        multi.report(&report);
        Ok(ImportOutcome { report, records })
    }

    /// Import one sheet. `Ok(None)` means the failure was contained.
    fn import_sheet<W: Workbook>(
        &self,
        workbook: &mut W,
        sheet: &SheetSelector,
        handler: &mut dyn SheetImport,
        events: &EventBus,
    ) -> ImportResult<Option<usize>> {
        match self.stream_sheet(workbook, sheet, handler) {
            Ok(records) => Ok(Some(records)),
            Err(err) if !self.options.throw_on_error && err.is_recoverable() => {
                match err.severity() {
                    ImportSeverity::Critical => {
                        error!(sheet = %sheet, error = %err, "sheet import failed")
                    }
                    _ => warn!(sheet = %sheet, error = %err, "sheet import failed"),
                }
                events.emit(&ImportEvent::ImportFailed { sheet, error: &err });
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn stream_sheet<W: Workbook>(
        &self,
        workbook: &mut W,
        sheet: &SheetSelector,
        handler: &mut dyn SheetImport,
    ) -> ImportResult<usize> {
        let options = self.stream_options(handler);
        let source = workbook.sheet(sheet)?;
        let registry = &self.registry;
        let consumer = handler.consumer();
        debug!(
            sheet = %sheet,
            consumer = consumer.name(),
            start_row = options.start_row,
            "importing sheet"
        );

        let mut delivered = 0;
        match consumer {
            Consumer::EachRow(target) => {
                stream_rows(&source, &options, registry, |kind, record| {
                    if kind == RowKind::Heading {
                        return Ok(());
                    }
                    delivered += 1;
                    target.on_row(record).map_err(ImportError::Handler)
                })?;
            }
            Consumer::Array(target) => {
                let mut all = Vec::new();
                stream_rows(&source, &options, registry, |kind, record| {
                    if kind == RowKind::Data {
                        all.push(record);
                    }
                    Ok(())
                })?;
                delivered = all.len();
                target.array(all).map_err(ImportError::Handler)?;
            }
            Consumer::Blocks(target) => {
                let size = target.chunk_size();
                if size == 0 {
                    return Err(ImportError::InvalidChunkSize { size });
                }
                let mut block = Vec::with_capacity(size);
                stream_rows(&source, &options, registry, |kind, record| {
                    if kind == RowKind::Heading {
                        return Ok(());
                    }
                    delivered += 1;
                    block.push(record);
                    if block.len() == size {
                        target
                            .block(mem::take(&mut block))
                            .map_err(ImportError::Handler)?;
                    }
                    Ok(())
                })?;
                if !block.is_empty() {
                    target.block(block).map_err(ImportError::Handler)?;
                }
            }
        }
        Ok(delivered)
    }

    fn stream_options(&self, handler: &dyn SheetImport) -> StreamOptions {
        StreamOptions {
            start_row: handler.start_row().unwrap_or(self.options.start_row),
            end_row: handler.limit().or(self.options.end_row),
            end_column: handler.end_column().or(self.options.end_column),
            heading: handler
                .heading()
                .unwrap_or_else(|| self.options.heading.clone()),
            grouped_headings: self.options.grouped_headings || handler.grouped_headings(),
            formatter: handler
                .formatter()
                .map(str::to_string)
                .or_else(|| self.options.formatter.clone()),
        }
    }
}
