//! Wide to long reshaping.

use crate::error::Error;
use crate::error::Result;
use crate::normalize::report::Issue;
use crate::normalize::report::Reason;
use crate::normalize::report::ValidationReport;
use crate::table::Column;
use crate::table::Table;
use crate::table::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::debug;

/// Naming and filtering of the reshaped output.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TidyOptions {
    /// Name of the column holding the former column names
    pub variable_name: String,
    /// Name of the column holding the measurements
    pub value_name: String,
    /// Skip blank measurements instead of emitting them
    pub drop_empty: bool,
}

impl Default for TidyOptions {
    fn default() -> Self {
        TidyOptions {
            variable_name: "variable".to_owned(),
            value_name: "value".to_owned(),
            drop_empty: false,
        }
    }
}

/// Reshapes a wide table into one row per (identifier, variable) observation.
/// See [`tidy_with`].
pub fn tidy(table: &Table, id_columns: &[&str], variable_columns: &[&str]) -> Result<(Table, ValidationReport)> {
    tidy_with(table, id_columns, variable_columns, &TidyOptions::default())
}

/// Reshapes a wide table into long form.
///
/// The output holds the id columns followed by the variable and value
/// columns. Rows are emitted row-major: for each input row, one output row
/// per variable column in the given order. Repeated (identifiers, variable)
/// pairs are kept and reported.
///
/// A table that is already in this shape for the same parameters is
/// returned unchanged.
pub fn tidy_with(
    table: &Table,
    id_columns: &[&str],
    variable_columns: &[&str],
    options: &TidyOptions,
) -> Result<(Table, ValidationReport)> {
    if id_columns.is_empty() {
        return Err(Error::InvalidArgument("no id columns given".to_owned()));
    }
    if variable_columns.is_empty() {
        return Err(Error::InvalidArgument("no variable columns given".to_owned()));
    }
    if options.variable_name == options.value_name {
        return Err(Error::InvalidArgument(format!(
            "variable and value columns share the name '{}'",
            options.value_name
        )));
    }
    let ids: HashSet<&str> = id_columns.iter().copied().collect();
    if let Some(overlap) = variable_columns.iter().find(|column| ids.contains(*column)) {
        return Err(Error::InvalidArgument(format!("column '{overlap}' is both an id and a variable column")));
    }
    for output in [&options.variable_name, &options.value_name] {
        if ids.contains(output.as_str()) {
            return Err(Error::InvalidArgument(format!("id column '{output}' clashes with an output column")));
        }
        if variable_columns.contains(&output.as_str()) {
            return Err(Error::InvalidArgument(format!("variable column '{output}' clashes with an output column")));
        }
    }
    let id_values = id_columns
        .iter()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| Error::InvalidArgument(format!("id column '{name}' not found")))
        })
        .collect::<Result<Vec<&Column>>>()?;

    if is_tidy(table, id_columns, variable_columns, options) {
        let report = duplicate_observations(table, id_columns, options)?;
        debug!(rows = table.height(), "table already in long form");
        return Ok((table.clone(), report));
    }

    let variable_values = variable_columns
        .iter()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| Error::InvalidArgument(format!("variable column '{name}' not found")))
        })
        .collect::<Result<Vec<&Column>>>()?;

    let capacity = table.height() * variable_columns.len();
    let mut ids_out: Vec<Vec<Value>> = vec![Vec::with_capacity(capacity); id_columns.len()];
    let mut variables_out = Vec::<Value>::with_capacity(capacity);
    let mut values_out = Vec::<Value>::with_capacity(capacity);
    for row in 0..table.height() {
        for (name, column) in variable_columns.iter().zip(&variable_values) {
            let value = column.values()[row].clone();
            if options.drop_empty && value.is_empty() {
                continue;
            }
            for (out, id) in ids_out.iter_mut().zip(&id_values) {
                out.push(id.values()[row].clone());
            }
            variables_out.push(Value::Text((*name).to_owned()));
            values_out.push(value);
        }
    }

    let mut columns: Vec<Column> = id_columns
        .iter()
        .zip(ids_out)
        .map(|(name, values)| Column::new(*name, values))
        .collect();
    columns.push(Column::new(options.variable_name.as_str(), variables_out));
    columns.push(Column::new(options.value_name.as_str(), values_out));
    let tidy = Table::new(table.name(), columns)?;
    let report = duplicate_observations(&tidy, id_columns, options)?;
    debug!(
        input_rows = table.height(),
        output_rows = tidy.height(),
        duplicates = report.len(),
        "reshaped table to long form"
    );
    Ok((tidy, report))
}

/// Whether `table` has exactly the shape `tidy_with` produces for these
/// parameters, with variable labels drawn from `variable_columns`.
fn is_tidy(table: &Table, id_columns: &[&str], variable_columns: &[&str], options: &TidyOptions) -> bool {
    let Some(variables) = table.column(&options.variable_name) else {
        return false;
    };
    let has_value = table.column(&options.value_name).is_some();
    let no_wide_columns = variable_columns.iter().all(|name| table.column(name).is_none());
    let labels: HashSet<&str> = variable_columns.iter().copied().collect();
    let labels_known = variables
        .values()
        .iter()
        .all(|label| label.as_str().map(|label| labels.contains(label)).unwrap_or(false));
    has_value && no_wide_columns && labels_known && table.width() == id_columns.len() + 2
}

/// Reports each output row repeating the identifiers and variable of an earlier row.
fn duplicate_observations(table: &Table, id_columns: &[&str], options: &TidyOptions) -> Result<ValidationReport> {
    let mut key_columns: Vec<&Column> = Vec::with_capacity(id_columns.len() + 1);
    for name in id_columns.iter().copied().chain(std::iter::once(options.variable_name.as_str())) {
        key_columns.push(table.column(name).ok_or_else(|| Error::UnknownColumn(name.to_owned()))?);
    }
    let position = table.position(&options.variable_name).unwrap_or(0);
    let mut seen = HashMap::<Vec<String>, usize>::with_capacity(table.height());
    let mut issues = Vec::new();
    for row in 0..table.height() {
        let key: Vec<String> = key_columns.iter().map(|column| column.values()[row].key()).collect();
        if let Some(first_row) = seen.get(&key) {
            issues.push((
                position,
                Issue {
                    row,
                    column: options.variable_name.to_owned(),
                    reason: Reason::DuplicateObservation { first_row: *first_row },
                },
            ));
        } else {
            seen.insert(key, row);
        }
    }
    Ok(ValidationReport::from_positioned(issues))
}
