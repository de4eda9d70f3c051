//! Validation report types.

use crate::table::SemanticType;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Why a value failed its column declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    /// The value cannot be read as the declared type
    TypeMismatch { expected: SemanticType, found: String },
    /// A number outside the declared `min`/`max`
    OutOfRange { value: f64, min: Option<f64>, max: Option<f64> },
    /// A category label not in the allowed set
    NotAllowed { value: String },
    /// A blank value in a required column
    Missing,
    /// A repeated value in a unique column
    DuplicateIdentifier { value: String, first_row: usize },
    /// A repeated (identifier, variable) pair in reshaped output
    DuplicateObservation { first_row: usize },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::TypeMismatch { expected, found } => write!(f, "expected {expected}, got {found}"),
            Reason::OutOfRange { value, min, max } => {
                let min = min.map(|min| min.to_string()).unwrap_or_else(|| "-inf".to_owned());
                let max = max.map(|max| max.to_string()).unwrap_or_else(|| "inf".to_owned());
                write!(f, "value {value} outside [{min}, {max}]")
            }
            Reason::NotAllowed { value } => write!(f, "'{value}' is not an allowed category"),
            Reason::Missing => f.write_str("required value is missing"),
            Reason::DuplicateIdentifier { value, first_row } => {
                write!(f, "duplicate value '{value}', first seen at row {first_row}")
            }
            Reason::DuplicateObservation { first_row } => {
                write!(f, "duplicate observation, first seen at row {first_row}")
            }
        }
    }
}

/// One failed value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Issue {
    /// Data row index (0-based, header excluded)
    pub row: usize,
    pub column: String,
    pub reason: Reason,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column '{}': {}", self.row, self.column, self.reason)
    }
}

/// Issues ordered by row, then by the column's position in the table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    /// Builds a report from issues tagged with their column position.
    pub(crate) fn from_positioned(mut issues: Vec<(usize, Issue)>) -> Self {
        issues.sort_by_key(|(position, issue)| (issue.row, *position));
        ValidationReport {
            issues: issues.into_iter().map(|(_, issue)| issue).collect(),
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Distinct rows with at least one issue, ascending.
    pub fn failed_rows(&self) -> Vec<usize> {
        self.issues
            .iter()
            .map(|issue| issue.row)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |issue| issue.column == column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl IntoIterator for ValidationReport {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}
