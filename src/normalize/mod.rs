//! Column type declaration, validation and tidy reshaping.
//!
//! Structural problems (a declared column that does not exist) fail the call.
//! Per-value problems never do: they are collected into a
//! [`ValidationReport`] and the offending values are left as they were.

mod coerce;
mod report;
mod reshape;
mod types;

pub use report::Issue;
pub use report::Reason;
pub use report::ValidationReport;
pub use reshape::tidy;
pub use reshape::tidy_with;
pub use reshape::TidyOptions;
pub use types::ColumnSpec;
pub use types::TypeMap;

use crate::error::Error;
use crate::error::Result;
use crate::table::Table;
use crate::table::Value;
use std::collections::HashMap;
use tracing::debug;
use tracing::warn;

/// Coerces every declared column to its type.
///
/// Returns a new table and the report of values that failed; those values
/// are kept unchanged. Columns without a declaration pass through. Fails with
/// [`Error::UnknownColumn`] before any coercion when `types` names a column
/// the table lacks.
pub fn declare_types(table: &Table, types: &TypeMap) -> Result<(Table, ValidationReport)> {
    let (columns, report) = check(table, types)?;
    let columns = table
        .columns()
        .iter()
        .zip(columns)
        .map(|(column, coerced)| match coerced {
            Some(values) => column.with_values(values),
            None => column.clone(),
        })
        .collect();
    let typed = Table::new(table.name(), columns)?;
    Ok((typed, report))
}

/// Runs the same checks as [`declare_types`] without producing a new table.
pub fn validate(table: &Table, types: &TypeMap) -> Result<ValidationReport> {
    check(table, types).map(|(_, report)| report)
}

/// Coerces the declared columns, returning the coerced values per table
/// column (`None` for undeclared ones) and the report.
fn check(table: &Table, types: &TypeMap) -> Result<(Vec<Option<Vec<Value>>>, ValidationReport)> {
    let mut specs = vec![None; table.width()];
    for (name, spec) in types.iter() {
        let position = table.position(name).ok_or_else(|| Error::UnknownColumn(name.to_owned()))?;
        specs[position] = Some(spec);
    }

    let mut issues = Vec::new();
    let mut columns = Vec::with_capacity(table.width());
    for (position, (column, spec)) in table.columns().iter().zip(specs).enumerate() {
        let Some(spec) = spec else {
            columns.push(None);
            continue;
        };
        let before = issues.len();
        let mut values = Vec::with_capacity(column.len());
        let mut seen = HashMap::<String, usize>::new();
        for (row, value) in column.values().iter().enumerate() {
            let mut issue = |reason| {
                issues.push((
                    position,
                    Issue {
                        row,
                        column: column.name().to_owned(),
                        reason,
                    },
                ))
            };
            let coerced = match coerce::coerce(value, spec) {
                Ok(coerced) => coerced,
                Err(reason) => {
                    issue(reason);
                    values.push(value.clone());
                    continue;
                }
            };
            if coerced.is_empty() {
                if spec.is_required() {
                    issue(Reason::Missing);
                }
            } else if spec.is_unique() {
                let key = coerced.key();
                if let Some(first_row) = seen.get(&key) {
                    issue(Reason::DuplicateIdentifier {
                        value: key,
                        first_row: *first_row,
                    });
                } else {
                    seen.insert(key, row);
                }
            }
            values.push(coerced);
        }
        let failures = issues.len() - before;
        if failures > 0 {
            warn!(column = column.name(), kind = %spec.kind, failures, "values failed type declaration");
        }
        columns.push(Some(values));
    }

    let report = ValidationReport::from_positioned(issues);
    debug!(
        table = table.name(),
        declared = types.len(),
        issues = report.len(),
        "checked column types"
    );
    Ok((columns, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use crate::table::SemanticType;

    fn sample() -> Table {
        Table::new(
            "Sheet1",
            vec![
                Column::new("id", vec![Value::Number(1.0), Value::Number(2.0)]),
                Column::new("value", vec![Value::from("10"), Value::from("abc")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn coerces_declared_columns() {
        let table = sample();
        let types = TypeMap::new().with("value", SemanticType::Numeric);
        let (typed, report) = declare_types(&table, &types).unwrap();

        let values = typed.column("value").unwrap().values();
        assert_eq!(values[0], Value::Number(10.0));
        assert_eq!(values[1], Value::from("abc"));
        assert_eq!(typed.column("id"), table.column("id"));

        assert_eq!(report.len(), 1);
        let issue = &report.issues()[0];
        assert_eq!(issue.row, 1);
        assert_eq!(issue.column, "value");
        assert_eq!(issue.reason.to_string(), "expected numeric, got non-numeric text 'abc'");
    }

    #[test]
    fn unknown_column_fails_without_touching_input() {
        let table = sample();
        let copy = table.clone();
        let types = TypeMap::new()
            .with("value", SemanticType::Numeric)
            .with("weight", SemanticType::Numeric);
        match declare_types(&table, &types) {
            Err(Error::UnknownColumn(name)) => assert_eq!(name, "weight"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(table, copy);
    }

    #[test]
    fn identifiers_must_be_present_and_unique() {
        let table = Table::new(
            "Sheet1",
            vec![
                Column::new("site", vec![Value::from("a"), Value::Empty, Value::from("b")]),
                Column::new("id", vec![Value::Number(1.0), Value::Empty, Value::from("1")]),
            ],
        )
        .unwrap();
        let types = TypeMap::new()
            .with("id", SemanticType::Identifier)
            .with("site", ColumnSpec::new(SemanticType::Category).required());
        let report = validate(&table, &types).unwrap();
        let entries: Vec<_> = report
            .iter()
            .map(|issue| (issue.row, issue.column.as_str(), issue.reason.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (1, "site", Reason::Missing),
                (1, "id", Reason::Missing),
                (2, "id", Reason::DuplicateIdentifier { value: "1".to_owned(), first_row: 0 }),
            ]
        );
        assert_eq!(report.failed_rows(), vec![1, 2]);
    }

    #[test]
    fn validate_matches_declare_types() {
        let table = sample();
        let types = TypeMap::new().with("value", ColumnSpec::new(SemanticType::Integer).max(5.0));
        let report = validate(&table, &types).unwrap();
        let (_, declared) = declare_types(&table, &types).unwrap();
        assert_eq!(report, declared);
        assert_eq!(report.len(), 2);
    }
}
