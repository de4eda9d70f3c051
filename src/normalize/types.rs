//! Column type declarations.

use crate::table::SemanticType;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Declared semantic type of one column, with optional constraints.
///
/// In configuration files a spec is either the bare type name
/// (`value = "numeric"`) or a table (`value = { type = "numeric", min = 0 }`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "ColumnSpecRepr")]
pub struct ColumnSpec {
    pub kind: SemanticType,
    /// Blank values are failures. Always on for identifiers.
    pub required: bool,
    /// Values must not repeat. Always on for identifiers.
    pub unique: bool,
    /// Inclusive lower bound for numeric and integer columns
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric and integer columns
    pub max: Option<f64>,
    /// Accepted labels for category columns
    pub allowed: Option<Vec<String>>,
    /// chrono format string tried before the built-in timestamp/date formats
    pub format: Option<String>,
}

impl ColumnSpec {
    pub fn new(kind: SemanticType) -> Self {
        ColumnSpec {
            kind,
            required: false,
            unique: false,
            min: None,
            max: None,
            allowed: None,
            format: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn allowed<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub(crate) fn is_required(&self) -> bool {
        self.required || self.kind == SemanticType::Identifier
    }

    pub(crate) fn is_unique(&self) -> bool {
        self.unique || self.kind == SemanticType::Identifier
    }
}

impl From<SemanticType> for ColumnSpec {
    fn from(kind: SemanticType) -> Self {
        ColumnSpec::new(kind)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnSpecRepr {
    Short(SemanticType),
    Full(FullColumnSpec),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FullColumnSpec {
    #[serde(rename = "type")]
    kind: SemanticType,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    unique: bool,
    min: Option<f64>,
    max: Option<f64>,
    allowed: Option<Vec<String>>,
    format: Option<String>,
}

impl From<ColumnSpecRepr> for ColumnSpec {
    fn from(repr: ColumnSpecRepr) -> Self {
        match repr {
            ColumnSpecRepr::Short(kind) => ColumnSpec::new(kind),
            ColumnSpecRepr::Full(full) => ColumnSpec {
                kind: full.kind,
                required: full.required,
                unique: full.unique,
                min: full.min,
                max: full.max,
                allowed: full.allowed,
                format: full.format,
            },
        }
    }
}

/// Column name to declared type.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TypeMap {
    columns: BTreeMap<String, ColumnSpec>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the declaration for `column`.
    pub fn with(mut self, column: impl Into<String>, spec: impl Into<ColumnSpec>) -> Self {
        self.insert(column, spec);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, spec: impl Into<ColumnSpec>) {
        self.columns.insert(column.into(), spec.into());
    }

    pub fn get(&self, column: &str) -> Option<&ColumnSpec> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSpec)> {
        self.columns.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>, C: Into<ColumnSpec>> FromIterator<(S, C)> for TypeMap {
    fn from_iter<T: IntoIterator<Item = (S, C)>>(iter: T) -> Self {
        let mut map = TypeMap::new();
        for (column, spec) in iter {
            map.insert(column, spec);
        }
        map
    }
}
