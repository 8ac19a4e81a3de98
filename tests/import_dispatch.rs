use std::sync::{Arc, Mutex};

use rust_sheet_import::error::HandlerResult;
use rust_sheet_import::import::{
    conditional_sheets, Consumer, EventBus, EventKind, ImportEvent, ImportOptions, ImportReport,
    Importer, MultiSheetImport, OnEachRow, SheetImport, SkipsUnknownSheets, ToArray, ToBlocks,
};
use rust_sheet_import::source::{Grid, MemoryWorkbook};
use rust_sheet_import::types::{Record, SheetSelector};
use rust_sheet_import::ImportError;

type Log = Arc<Mutex<Vec<String>>>;

fn people(title: &str, rows: usize) -> Grid {
    let mut grid = Grid::new(title).with_row(["Id", "Name"]);
    for i in 1..=rows {
        grid.push_row([format!("{i}"), format!("person {i}")]);
    }
    grid
}

fn two_sheets() -> MemoryWorkbook {
    MemoryWorkbook::default()
        .with_sheet(people("Sheet1", 3))
        .with_sheet(people("Sheet2", 2))
}

fn recording_bus(log: &Log) -> EventBus {
    let mut bus = EventBus::new();
    for kind in [
        EventKind::BeforeImport,
        EventKind::AfterImport,
        EventKind::BeforeSheet,
        EventKind::AfterSheet,
        EventKind::ImportFailed,
    ] {
        let log = Arc::clone(log);
        bus.on(kind, move |event| {
            let entry = match event {
                ImportEvent::BeforeImport => "before_import".to_string(),
                ImportEvent::AfterImport { report } => {
                    format!("after_import:{}", report.success_count)
                }
                ImportEvent::BeforeSheet { sheet } => format!("before_sheet:{sheet}"),
                ImportEvent::AfterSheet { sheet, succeeded } => {
                    format!("after_sheet:{sheet}:{succeeded}")
                }
                ImportEvent::ImportFailed { sheet, error } => {
                    format!("failed:{sheet}:{error}")
                }
            };
            log.lock().unwrap().push(entry);
        });
    }
    bus
}

/// Per-row sheet handler that records names and optionally fails on a given row.
struct RowSink {
    names: Log,
    fail_on_row: Option<usize>,
}

impl OnEachRow for RowSink {
    fn on_row(&mut self, record: Record) -> HandlerResult {
        if Some(record.row()) == self.fail_on_row {
            return Err(format!("bad row {}", record.row()).into());
        }
        let name = record.value("name").map(|v| v.to_text()).unwrap_or_default();
        self.names.lock().unwrap().push(name);
        Ok(())
    }
}

impl SheetImport for RowSink {
    fn consumer(&mut self) -> Consumer<'_> {
        Consumer::EachRow(self)
    }
}

struct Multi {
    entries: Vec<(SheetSelector, Option<usize>)>,
    names: Log,
    events: Log,
    skipped: Option<Skipped>,
    reported: Option<ImportReport>,
}

impl Multi {
    fn new(entries: Vec<(SheetSelector, Option<usize>)>) -> Self {
        Self {
            entries,
            names: Log::default(),
            events: Log::default(),
            skipped: None,
            reported: None,
        }
    }

    fn skipping(mut self) -> Self {
        self.skipped = Some(Skipped::default());
        self
    }
}

#[derive(Debug, Default, PartialEq)]
struct Skipped(Vec<SheetSelector>);

impl SkipsUnknownSheets for Skipped {
    fn on_unknown_sheet(&mut self, sheet: &SheetSelector) {
        self.0.push(sheet.clone());
    }
}

impl MultiSheetImport for Multi {
    fn sheets(&mut self) -> Vec<(SheetSelector, Box<dyn SheetImport>)> {
        self.entries
            .iter()
            .map(|(sheet, fail_on_row)| {
                let handler: Box<dyn SheetImport> = Box::new(RowSink {
                    names: Arc::clone(&self.names),
                    fail_on_row: *fail_on_row,
                });
                (sheet.clone(), handler)
            })
            .collect()
    }

    fn unknown_sheets(&mut self) -> Option<&mut dyn SkipsUnknownSheets> {
        self.skipped
            .as_mut()
            .map(|s| s as &mut dyn SkipsUnknownSheets)
    }

    fn report(&mut self, report: &ImportReport) {
        self.reported = Some(report.clone());
    }

    fn register_events(&self) -> EventBus {
        recording_bus(&self.events)
    }
}

fn lenient() -> Importer {
    Importer::new(ImportOptions {
        throw_on_error: false,
        ..Default::default()
    })
}

#[test]
fn failing_sheet_is_contained_when_not_throwing() {
    let mut handler = Multi::new(vec![("Sheet1".into(), None), ("Sheet2".into(), Some(2))]);
    let outcome = lenient().run_sheets(&mut two_sheets(), &mut handler).unwrap();

    let report = &outcome.report;
    assert_eq!(report.sheet_count, 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.failed_sheet_names, vec![SheetSelector::from("Sheet2")]);
    assert!(!outcome.is_success());
    assert_eq!(outcome.records, 3);
    assert_eq!(handler.reported.as_ref(), Some(report));

    let events = handler.events.lock().unwrap();
    let failures: Vec<_> = events.iter().filter(|e| e.starts_with("failed:")).collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("bad row 2"));
}

#[test]
fn events_bracket_the_run_and_each_sheet() {
    let mut handler = Multi::new(vec![("Sheet1".into(), None), ("Sheet2".into(), Some(3))]);
    lenient().run_sheets(&mut two_sheets(), &mut handler).unwrap();

    let events = handler.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "before_import".to_string(),
            "before_sheet:'Sheet1'".to_string(),
            "after_sheet:'Sheet1':true".to_string(),
            "before_sheet:'Sheet2'".to_string(),
            "failed:'Sheet2':handler failed: bad row 3".to_string(),
            "after_sheet:'Sheet2':false".to_string(),
            "after_import:1".to_string(),
        ]
    );
}

#[test]
fn throwing_run_aborts_without_after_import() {
    let mut handler = Multi::new(vec![("Sheet1".into(), Some(2)), ("Sheet2".into(), None)]);
    let err = Importer::default()
        .run_sheets(&mut two_sheets(), &mut handler)
        .unwrap_err();

    assert!(matches!(err, ImportError::Handler(_)));
    assert!(handler.reported.is_none());
    assert!(handler.names.lock().unwrap().is_empty());
    assert_eq!(
        *handler.events.lock().unwrap(),
        vec!["before_import".to_string(), "before_sheet:'Sheet1'".to_string()]
    );
}

#[test]
fn unknown_sheet_is_fatal_without_skip_capability() {
    let mut handler = Multi::new(vec![("Sheet1".into(), None), ("Missing".into(), None)]);
    let err = lenient()
        .run_sheets(&mut two_sheets(), &mut handler)
        .unwrap_err();
    assert!(
        matches!(err, ImportError::SheetNotFound { ref sheet } if *sheet == SheetSelector::from("Missing"))
    );
}

#[test]
fn unknown_sheets_are_skipped_with_capability() {
    let mut handler = Multi::new(vec![
        (SheetSelector::Index(7), None),
        ("Sheet2".into(), None),
        ("Missing".into(), None),
    ])
    .skipping();
    let outcome = Importer::default()
        .run_sheets(&mut two_sheets(), &mut handler)
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.report.success_count, 1);
    assert_eq!(
        handler.skipped,
        Some(Skipped(vec![SheetSelector::Index(7), SheetSelector::from("Missing")]))
    );
    assert_eq!(outcome.report.skipped_sheet_names.len(), 2);
    assert_eq!(
        *handler.names.lock().unwrap(),
        vec!["person 1".to_string(), "person 2".to_string()]
    );
}

#[test]
fn sheets_can_be_selected_by_index() {
    let mut handler = Multi::new(vec![(SheetSelector::Index(1), None)]);
    let outcome = Importer::default()
        .run_sheets(&mut two_sheets(), &mut handler)
        .unwrap();
    assert_eq!(outcome.records, 2);
}

#[test]
fn conditional_sheets_restricts_the_mapping() {
    let all: Vec<(SheetSelector, Option<usize>)> =
        vec![("Sheet1".into(), None), ("Sheet2".into(), None)];
    let mut handler = Multi::new(conditional_sheets(all, &["Sheet2".into()]));
    let outcome = Importer::default()
        .run_sheets(&mut two_sheets(), &mut handler)
        .unwrap();

    assert_eq!(outcome.report.sheet_names, vec![SheetSelector::from("Sheet2")]);
    assert_eq!(outcome.records, 2);
}

struct Chunks {
    size: usize,
    sizes: Vec<usize>,
    first_rows: Vec<usize>,
}

impl ToBlocks for Chunks {
    fn chunk_size(&self) -> usize {
        self.size
    }

    fn block(&mut self, records: Vec<Record>) -> HandlerResult {
        self.sizes.push(records.len());
        self.first_rows.push(records[0].row());
        Ok(())
    }
}

impl SheetImport for Chunks {
    fn consumer(&mut self) -> Consumer<'_> {
        Consumer::Blocks(self)
    }
}

#[test]
fn chunked_delivery_of_seven_records_by_three() {
    let mut workbook = MemoryWorkbook::new(vec![people("Data", 7)]);
    let mut handler = Chunks {
        size: 3,
        sizes: Vec::new(),
        first_rows: Vec::new(),
    };
    let outcome = Importer::default()
        .run_sheet(&mut workbook, &mut handler)
        .unwrap();

    assert_eq!(outcome.records, 7);
    assert_eq!(handler.sizes, vec![3, 3, 1]);
    assert_eq!(handler.first_rows, vec![2, 5, 8]);
}

struct Everything {
    start: usize,
    received: Option<Vec<Record>>,
}

impl ToArray for Everything {
    fn array(&mut self, records: Vec<Record>) -> HandlerResult {
        self.received = Some(records);
        Ok(())
    }
}

impl SheetImport for Everything {
    fn consumer(&mut self) -> Consumer<'_> {
        Consumer::Array(self)
    }

    fn start_row(&self) -> Option<usize> {
        Some(self.start)
    }
}

#[test]
fn start_row_below_one_fails_before_reading() {
    let mut handler = Everything {
        start: 0,
        received: None,
    };
    let err = lenient()
        .run_sheet(&mut two_sheets(), &mut handler)
        .unwrap_err();

    assert!(matches!(err, ImportError::InvalidRange { start_row: 0, .. }));
    assert!(handler.received.is_none());
}

#[test]
fn single_sheet_run_targets_the_configured_sheet() {
    let mut handler = Everything {
        start: 1,
        received: None,
    };
    let importer = Importer::new(ImportOptions {
        sheet: Some("Sheet2".into()),
        ..Default::default()
    });
    let outcome = importer.run_sheet(&mut two_sheets(), &mut handler).unwrap();

    let records = handler.received.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value("id").and_then(|v| v.as_str()), Some("1"));
    assert_eq!(outcome.report.sheet_names, vec![SheetSelector::from("Sheet2")]);
    assert!(outcome.is_success());
}

#[test]
fn single_sheet_uses_the_active_sheet_by_default() {
    let mut workbook = two_sheets();
    workbook.set_active(1).unwrap();

    let names = Log::default();
    let mut handler = RowSink {
        names: Arc::clone(&names),
        fail_on_row: None,
    };
    let outcome = Importer::default()
        .run_sheet(&mut workbook, &mut handler)
        .unwrap();

    assert_eq!(outcome.report.sheet_names, vec![SheetSelector::Index(1)]);
    assert_eq!(names.lock().unwrap().len(), 2);
}

#[test]
fn single_sheet_failure_is_reported_when_not_throwing() {
    let names = Log::default();
    let mut handler = RowSink {
        names: Arc::clone(&names),
        fail_on_row: Some(3),
    };
    let outcome = lenient()
        .run_sheet(&mut two_sheets(), &mut handler)
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.report.failed_sheet_names, vec![SheetSelector::Index(0)]);
    assert_eq!(outcome.records, 0);
    assert_eq!(names.lock().unwrap().len(), 1);
}
