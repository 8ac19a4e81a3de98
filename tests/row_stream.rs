use rust_sheet_import::heading::FormatterRegistry;
use rust_sheet_import::source::{ColumnRef, Grid};
use rust_sheet_import::stream::{stream_rows, RowKind, StreamOptions};
use rust_sheet_import::types::{CellValue, FieldValue, HeadingMap, HeadingMode, Record};

fn run(grid: &Grid, options: &StreamOptions) -> (Option<HeadingMap>, Vec<Record>) {
    let mut data = Vec::new();
    let heading = stream_rows(grid, options, &FormatterRegistry::new(), |kind, record| {
        if kind == RowKind::Data {
            data.push(record);
        }
        Ok(())
    })
    .unwrap();
    (heading, data)
}

fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

#[test]
fn ten_blank_rows_are_a_gap_eleven_end_the_data() {
    let with_gap = |blank: usize| {
        Grid::default()
            .with_row(["value"])
            .with_row([num(1.0)])
            .with_blank_rows(blank)
            .with_row([num(2.0)])
    };

    let (_, rows) = run(&with_gap(10), &StreamOptions::default());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].value("value"), Some(&num(2.0)));

    let (_, rows) = run(&with_gap(11), &StreamOptions::default());
    assert_eq!(rows.len(), 1);
}

#[test]
fn grouped_and_first_wins_collision_policies() {
    let grid = Grid::default()
        .with_row(["a", "a", "b"])
        .with_row([num(1.0), num(2.0), num(3.0)]);

    let (_, first_wins) = run(&grid, &StreamOptions::default());
    assert_eq!(first_wins[0].get("a"), Some(&FieldValue::Single(num(1.0))));
    assert_eq!(first_wins[0].get("b"), Some(&FieldValue::Single(num(3.0))));
    assert_eq!(first_wins[0].len(), 2);

    let grouped = StreamOptions {
        grouped_headings: true,
        ..Default::default()
    };
    let (_, grouped) = run(&grid, &grouped);
    assert_eq!(
        grouped[0].get("a"),
        Some(&FieldValue::Group(vec![num(1.0), num(2.0)]))
    );
    assert_eq!(grouped[0].get("b"), Some(&FieldValue::Single(num(3.0))));
}

#[test]
fn custom_heading_substitutes_or_falls_back_to_positions() {
    let grid = Grid::default()
        .with_row(["x", "y", "z"])
        .with_row(["1", "2", "3"]);

    let matching = StreamOptions {
        heading: HeadingMode::Custom(vec!["Código".into(), "Nome".into(), "Preço".into()]),
        ..Default::default()
    };
    let (heading, rows) = run(&grid, &matching);
    assert_eq!(
        heading.unwrap().keys().collect::<Vec<_>>(),
        vec!["codigo", "nome", "preco"]
    );
    assert_eq!(rows[0].value("preco").and_then(|v| v.as_str()), Some("3"));

    let short = StreamOptions {
        heading: HeadingMode::Custom(vec!["a".into(), "b".into()]),
        ..Default::default()
    };
    let (heading, rows) = run(&grid, &short);
    assert_eq!(heading.unwrap().keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);
    assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);
}

#[test]
fn headingless_streams_key_by_column_letters() {
    let grid = Grid::default()
        .with_row(["id", "name"])
        .with_row(["1", "Ada"]);
    let options = StreamOptions {
        heading: HeadingMode::None,
        ..Default::default()
    };

    let (heading, rows) = run(&grid, &options);
    assert!(heading.is_none());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].value("B").and_then(|v| v.as_str()), Some("name"));
}

#[test]
fn range_bounds_limit_rows_and_columns() {
    let grid = Grid::default()
        .with_row(["title row"])
        .with_row(["id", "name", "ignored"])
        .with_row(["1", "Ada", "x"])
        .with_row(["2", "Grace", "y"])
        .with_row(["3", "Linus", "z"]);
    let options = StreamOptions {
        start_row: 2,
        end_row: Some(4),
        end_column: ColumnRef::from_letters("B"),
        ..Default::default()
    };

    let (heading, rows) = run(&grid, &options);
    assert_eq!(heading.unwrap().keys().collect::<Vec<_>>(), vec!["id", "name"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].row(), 4);
    assert!(rows[1].get("ignored").is_none());
}

#[test]
fn heading_derivation_is_idempotent() {
    let grid = Grid::default()
        .with_row(["Data de Emissão", " 1st Name ", "Valor (R$)"])
        .with_row(["2024-01-01", "Ada", "10"]);

    let (first, _) = run(&grid, &StreamOptions::default());
    let (second, _) = run(&grid, &StreamOptions::default());
    assert_eq!(first, second);
    assert_eq!(
        first.unwrap().keys().collect::<Vec<_>>(),
        vec!["data_de_emissao", "_1st_name", "valor_r"]
    );
}

#[test]
fn records_serialize_as_ordered_json_objects() {
    let grid = Grid::default()
        .with_row(["zeta", "alpha"])
        .with_row([CellValue::from("z"), CellValue::Null]);

    let (_, rows) = run(&grid, &StreamOptions::default());
    assert_eq!(
        serde_json::to_string(&rows[0]).unwrap(),
        r#"{"zeta":"z","alpha":null}"#
    );
}

#[test]
fn headingless_stream_handles_the_widest_sheet() {
    const XFD: usize = 16_384;
    let mut grid = Grid::default();
    for row in 0..50 {
        grid.push_row((0..XFD).map(|col| num((row * XFD + col) as f64)));
    }
    let options = StreamOptions {
        heading: HeadingMode::None,
        ..Default::default()
    };

    let (_, rows) = run(&grid, &options);
    assert_eq!(rows.len(), 50);
    assert_eq!(rows[49].len(), XFD);
    assert_eq!(rows[49].keys().last(), Some("XFD"));
    assert_eq!(rows[49].value("XFD"), Some(&num((50 * XFD - 1) as f64)));
}
