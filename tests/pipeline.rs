mod common;

use common::*;
use tempfile::TempDir;
use tidy_sheet::declare_types;
use tidy_sheet::run;
use tidy_sheet::tidy;
use tidy_sheet::validate;
use tidy_sheet::ColumnSpec;
use tidy_sheet::DatasetRef;
use tidy_sheet::Error;
use tidy_sheet::PipelineConfig;
use tidy_sheet::Reason;
use tidy_sheet::SemanticType;
use tidy_sheet::Table;
use tidy_sheet::TypeMap;
use tidy_sheet::Value;
use tidy_sheet::Workbook;

fn faults_sheet(sheet: &str) -> Table {
    let mut workbook = Workbook::from_bytes("faults.xlsx", faults_xlsx()).unwrap();
    workbook.load_sheet(sheet).unwrap()
}

#[test]
fn numeric_declaration_reports_text() {
    let bytes = xlsx(
        &[(
            "Sheet1",
            vec![
                vec![Text("id"), Text("value")],
                vec![Number(1.0), Text("10")],
                vec![Number(2.0), Text("abc")],
            ],
        )],
        false,
    );
    let table = Workbook::from_bytes("faults.xlsx", bytes).unwrap().load_sheet("Sheet1").unwrap();
    let types = TypeMap::new()
        .with("id", SemanticType::Identifier)
        .with("value", SemanticType::Numeric);

    let (typed, report) = declare_types(&table, &types).unwrap();
    assert_eq!(typed.column("id").unwrap().values(), &[Value::from("1"), Value::from("2")]);
    assert_eq!(typed.column("value").unwrap().values(), &[Value::Number(10.0), Value::from("abc")]);

    assert_eq!(report.len(), 1);
    let issue = &report.issues()[0];
    assert_eq!(issue.row, 1);
    assert_eq!(issue.column, "value");
    assert!(matches!(issue.reason, Reason::TypeMismatch { expected: SemanticType::Numeric, .. }));
    assert_eq!(validate(&table, &types).unwrap(), report);
}

#[test]
fn unknown_column_leaves_table_untouched() {
    let table = faults_sheet("Sheet1");
    let before = table.clone();
    let types = TypeMap::new()
        .with("value", SemanticType::Numeric)
        .with("missing", SemanticType::Text);
    match declare_types(&table, &types) {
        Err(Error::UnknownColumn(name)) => assert_eq!(name, "missing"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(table, before);
}

#[test]
fn duplicate_identifiers_are_reported() {
    let bytes = xlsx(
        &[("Sheet1", vec![vec![Text("id")], vec![Text("a")], vec![Text("b")], vec![Text("a")]])],
        false,
    );
    let table = Workbook::from_bytes("ids.xlsx", bytes).unwrap().load_sheet("Sheet1").unwrap();
    let types = TypeMap::new().with("id", SemanticType::Identifier);
    let report = validate(&table, &types).unwrap();
    assert_eq!(report.failed_rows(), vec![2]);
    assert!(matches!(
        &report.issues()[0].reason,
        Reason::DuplicateIdentifier { value, first_row: 0 } if value == "a"
    ));
}

#[test]
fn tidy_melts_and_is_idempotent() {
    let wide = faults_sheet("Sheet2");
    let (long, report) = tidy(&wide, &["id"], &["x", "y"]).unwrap();
    assert!(report.is_empty());
    assert_eq!(long.column_names(), vec!["id", "variable", "value"]);
    assert_eq!(long.height(), 2);
    assert_eq!(long.column("variable").unwrap().values(), &[Value::from("x"), Value::from("y")]);
    assert_eq!(long.column("value").unwrap().values(), &[Value::Number(5.0), Value::Number(7.0)]);

    let (again, _) = tidy(&long, &["id"], &["x", "y"]).unwrap();
    assert_eq!(again, long);
}

#[test]
fn tidy_rejects_bad_arguments() {
    let wide = faults_sheet("Sheet2");
    assert!(matches!(tidy(&wide, &[], &["x"]), Err(Error::InvalidArgument(_))));
    assert!(matches!(tidy(&wide, &["id"], &["id", "x"]), Err(Error::InvalidArgument(_))));
    assert!(matches!(tidy(&wide, &["id"], &["z"]), Err(Error::InvalidArgument(_))));
}

#[test]
fn runs_from_toml_config() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("raw")).unwrap();
    write(&dir.path().join("raw"), "faults.xlsx", &faults_xlsx());

    let text = format!(
        r#"
        base_dir = "{}"
        file_name = "raw/../raw/faults.xlsx"
        sheet_name = "Sheet2"

        [columns]
        id = "identifier"
        x = {{ type = "integer", min = 0 }}
        y = "numeric"

        [tidy]
        id_columns = ["id"]
        variable_columns = ["x", "y"]
        options = {{ variable_name = "axis", value_name = "reading" }}
        "#,
        dir.path().display().to_string().replace('\\', "/")
    );
    let config = PipelineConfig::from_toml_str(&text).unwrap();
    assert_eq!(config.dataset().unwrap().path(), dir.path().join("raw").join("faults.xlsx"));

    let output = run(&config).unwrap();
    assert!(output.validation.is_empty());
    assert!(output.reshape.is_empty());
    assert_eq!(output.table.column_names(), vec!["id", "axis", "reading"]);
    assert_eq!(
        output.table.column("reading").unwrap().values(),
        &[Value::Integer(5), Value::Number(7.0)]
    );
    assert_eq!(output.table.column("id").unwrap().values(), &[Value::from("1"), Value::from("1")]);
}

#[test]
fn run_reports_missing_workbook() {
    let dir = TempDir::new().unwrap();
    let mut config = PipelineConfig::new(dir.path(), "absent.xlsx", "Sheet1");
    config.columns.insert("id", ColumnSpec::new(SemanticType::Identifier).required());
    assert!(matches!(run(&config), Err(Error::FileNotFound(_))));

    let dataset = DatasetRef::new(dir.path(), "absent.xlsx").unwrap();
    assert_eq!(dataset.path(), dir.path().join("absent.xlsx"));
}
