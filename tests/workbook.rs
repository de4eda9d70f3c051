mod common;

use chrono::NaiveDate;
use chrono::NaiveTime;
use common::*;
use tempfile::TempDir;
use tidy_sheet::list_sheets;
use tidy_sheet::load_sheet;
use tidy_sheet::load_sheet_with;
use tidy_sheet::open_workbook;
use tidy_sheet::Error;
use tidy_sheet::Format;
use tidy_sheet::LoadOptions;
use tidy_sheet::Range;
use tidy_sheet::Value;
use tidy_sheet::Workbook;

#[test]
fn missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let result = open_workbook(dir.path().join("absent.xlsx"));
    assert!(matches!(result, Err(Error::FileNotFound(_))));
}

#[test]
fn non_spreadsheet_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let text = write(dir.path(), "notes.txt", b"id,value\n1,10\n");
    assert!(matches!(open_workbook(&text), Err(Error::UnsupportedFormat { .. })));

    let fake = write(dir.path(), "fake.xlsx", b"id,value\n1,10\n");
    assert!(matches!(open_workbook(&fake), Err(Error::CorruptFile { .. })));

    assert!(matches!(open_workbook(dir.path()), Err(Error::UnsupportedFormat { .. })));
}

#[test]
fn zip_without_workbook_part_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let bytes = ods(&[("Sheet1", "")]);
    let path = write(dir.path(), "renamed.xlsx", &bytes);
    match open_workbook(&path) {
        Err(Error::CorruptFile { reason, .. }) => assert!(reason.contains("xl/workbook.xml")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn lists_sheets_in_declared_order() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "faults.xlsx", &faults_xlsx());
    let mut workbook = open_workbook(&path).unwrap();
    assert_eq!(workbook.format(), Format::Xlsx);
    assert_eq!(list_sheets(&workbook), vec!["Sheet1", "Sheet2"]);

    match load_sheet(&mut workbook, "Sheet3") {
        Err(Error::SheetNotFound { sheet, .. }) => assert_eq!(sheet, "Sheet3"),
        other => panic!("unexpected {other:?}"),
    }
    // still usable after a failed load
    assert_eq!(load_sheet(&mut workbook, "Sheet2").unwrap().width(), 3);
}

#[test]
fn loads_header_and_rows() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "faults.xlsx", &faults_xlsx());
    let mut workbook = open_workbook(&path).unwrap();
    let table = load_sheet(&mut workbook, "Sheet1").unwrap();
    workbook.close();

    assert_eq!(table.name(), "Sheet1");
    assert_eq!(table.column_names(), vec!["id", "value"]);
    assert_eq!(table.height(), 2);
    assert_eq!(table.column("id").unwrap().values(), &[Value::Number(1.0), Value::Number(2.0)]);
    assert_eq!(table.column("value").unwrap().values(), &[Value::from("10"), Value::from("20")]);
}

#[test]
fn reads_typed_cells() {
    let bytes = xlsx(
        &[(
            "Data",
            vec![
                vec![Text("day"), Text("at"), Text("ok"), Text("note")],
                vec![Date(40179.0), Time(0.75), Bool(true), Text("R&D <lab>")],
                vec![Date(40180.5), Blank, Bool(false), Blank],
            ],
        )],
        false,
    );
    let mut workbook = Workbook::from_bytes("typed.xlsx", bytes).unwrap();
    let table = workbook.load_sheet("Data").unwrap();
    let day = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    assert_eq!(
        table.column("day").unwrap().values(),
        &[
            Value::Date(day),
            Value::Timestamp(NaiveDate::from_ymd_opt(2010, 1, 2).unwrap().and_hms_opt(12, 0, 0).unwrap()),
        ]
    );
    assert_eq!(table.column("at").unwrap().values(), &[Value::Time(NaiveTime::from_hms_opt(18, 0, 0).unwrap()), Value::Empty]);
    assert_eq!(table.column("ok").unwrap().values(), &[Value::Bool(true), Value::Bool(false)]);
    assert_eq!(table.column("note").unwrap().get(0), Some(&Value::from("R&D <lab>")));
}

#[test]
fn honours_1904_date_system() {
    let bytes = xlsx(&[("Sheet1", vec![vec![Text("day")], vec![Date(0.0)], vec![Date(38717.0)]])], true);
    let mut workbook = Workbook::from_bytes("mac.xlsx", bytes).unwrap();
    let table = workbook.load_sheet("Sheet1").unwrap();
    assert_eq!(
        table.column("day").unwrap().values(),
        &[
            Value::Date(NaiveDate::from_ymd_opt(1904, 1, 1).unwrap()),
            Value::Date(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()),
        ]
    );
}

#[test]
fn names_blank_and_repeated_headers() {
    let bytes = xlsx(
        &[("Sheet1", vec![vec![Text("id"), Blank, Text("id")], vec![Number(1.0), Number(2.0), Number(3.0)]])],
        false,
    );
    let mut workbook = Workbook::from_bytes("headers.xlsx", bytes).unwrap();
    let table = workbook.load_sheet("Sheet1").unwrap();
    assert_eq!(table.column_names(), vec!["id", "column2", "id.1"]);
}

#[test]
fn error_cells_fail_unless_nulled() {
    let bytes = xlsx(&[("Calc", vec![vec![Text("ratio")], vec![Number(0.5)], vec![ErrorCode("#DIV/0!")]])], false);
    let mut workbook = Workbook::from_bytes("calc.xlsx", bytes).unwrap();
    match workbook.load_sheet("Calc") {
        Err(Error::CellError { file, sheet, reference, value }) => {
            assert_eq!(file, "calc.xlsx");
            assert_eq!(sheet, "Calc");
            assert_eq!(reference, "A3");
            assert_eq!(value, "#DIV/0!");
        }
        other => panic!("unexpected {other:?}"),
    }

    let options = LoadOptions {
        error_as_null: true,
        ..LoadOptions::default()
    };
    let table = load_sheet_with(&mut workbook, "Calc", &options).unwrap();
    assert_eq!(table.column("ratio").unwrap().values(), &[Value::Number(0.5), Value::Empty]);
}

#[test]
fn range_limit_nulls_and_empty_rows() {
    let bytes = xlsx(
        &[(
            "Sheet1",
            vec![
                vec![Text("title")],
                vec![Text("skip"), Text("id"), Text("score")],
                vec![Text("x"), Number(1.0), Text("NA")],
                vec![Blank, Blank, Blank],
                vec![Text("x"), Number(3.0), Number(9.0)],
                vec![Text("x"), Number(4.0), Number(8.0)],
            ],
        )],
        false,
    );
    let mut workbook = Workbook::from_bytes("ranged.xlsx", bytes).unwrap();

    let options = LoadOptions {
        range: Some(Range::try_from("B2:C6").unwrap()),
        nulls: ["NA".to_owned()].into_iter().collect(),
        skip_empty_rows: true,
        ..LoadOptions::default()
    };
    let table = workbook.load_sheet_with("Sheet1", &options).unwrap();
    assert_eq!(table.column_names(), vec!["id", "score"]);
    assert_eq!(table.column("id").unwrap().values(), &[Value::Number(1.0), Value::Number(3.0), Value::Number(4.0)]);
    assert_eq!(table.column("score").unwrap().values(), &[Value::Empty, Value::Number(9.0), Value::Number(8.0)]);

    let options = LoadOptions {
        range: Some(Range::try_from("B2:C").unwrap()),
        row_limit: Some(3),
        ..LoadOptions::default()
    };
    let table = workbook.load_sheet_with("Sheet1", &options).unwrap();
    assert_eq!(table.height(), 3);
    assert_eq!(
        table.column("score").unwrap().values(),
        &[Value::from("NA"), Value::Empty, Value::Number(9.0)]
    );
}

#[test]
fn sniffs_zip_content_for_unknown_extensions() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "export.dat", &faults_xlsx());
    let workbook = open_workbook(&path).unwrap();
    assert_eq!(workbook.format(), Format::Xlsx);

    let path = write(dir.path(), "export.bin", &ods(&[("Only", "")]));
    let workbook = open_workbook(&path).unwrap();
    assert_eq!(workbook.format(), Format::Ods);
    assert_eq!(workbook.sheet_names(), &["Only".to_owned()]);
}

#[test]
fn reads_ods_tables() {
    let people = [
        row(&[string_cell("id"), string_cell("name"), string_cell("score")]),
        row(&[
            float_cell(1.0),
            r#"<table:table-cell office:value-type="string"><office:annotation><text:p>checked</text:p></office:annotation><text:p>Ann<text:s text:c="2"/>Lee</text:p><text:p>second</text:p></table:table-cell>"#.to_owned(),
            r#"<table:table-cell office:value-type="float" office:value="2.5" table:number-columns-repeated="1"/>"#.to_owned(),
        ]),
        r#"<table:table-row table:number-rows-repeated="2"><table:table-cell office:value-type="float" office:value="7" table:number-columns-repeated="2"/><table:table-cell office:value-type="boolean" office:boolean-value="true"/></table:table-row>"#.to_owned(),
        r#"<table:table-row table:number-rows-repeated="1048570"><table:table-cell table:number-columns-repeated="1024"/></table:table-row>"#.to_owned(),
    ]
    .concat();
    let events = [
        row(&[string_cell("day"), string_cell("at")]),
        row(&[
            r#"<table:table-cell office:value-type="date" office:date-value="2016-05-04T10:30:00"/>"#.to_owned(),
            r#"<table:table-cell office:value-type="time" office:time-value="PT10H30M00S"/>"#.to_owned(),
        ]),
    ]
    .concat();
    let mut workbook = Workbook::from_bytes("people.ods", ods(&[("People", &people), ("Events", &events)])).unwrap();
    assert_eq!(workbook.format(), Format::Ods);
    assert_eq!(workbook.sheet_names(), &["People".to_owned(), "Events".to_owned()]);

    let table = workbook.load_sheet("People").unwrap();
    assert_eq!(table.height(), 3);
    assert_eq!(table.column("name").unwrap().values()[0], Value::from("Ann  Lee\nsecond"));
    assert_eq!(
        table.column("id").unwrap().values(),
        &[Value::Number(1.0), Value::Number(7.0), Value::Number(7.0)]
    );
    assert_eq!(table.column("score").unwrap().values()[1..], [Value::Bool(true), Value::Bool(true)]);

    let table = workbook.load_sheet("Events").unwrap();
    let day = NaiveDate::from_ymd_opt(2016, 5, 4).unwrap();
    assert_eq!(table.column("day").unwrap().values(), &[Value::Timestamp(day.and_hms_opt(10, 30, 0).unwrap())]);
    assert_eq!(table.column("at").unwrap().values(), &[Value::Time(NaiveTime::from_hms_opt(10, 30, 0).unwrap())]);
}

#[test]
fn empty_sheets_and_workbooks_are_legal() {
    let mut workbook = Workbook::from_bytes("empty.ods", ods(&[("Blank", "")])).unwrap();
    let table = workbook.load_sheet("Blank").unwrap();
    assert_eq!(table.width(), 0);
    assert_eq!(table.height(), 0);

    let workbook = Workbook::from_bytes("none.xlsx", xlsx(&[], false)).unwrap();
    assert!(list_sheets(&workbook).is_empty());
}
