use crate::error::Error;
use crate::table::value::Value;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Semantic column types a caller can declare.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SemanticType {
    /// Key of an observational unit; must be present in every row
    Identifier,
    /// One of a limited set of text labels
    Category,
    /// Date and time of day
    Timestamp,
    Date,
    /// 64-bit floating point numbers
    Numeric,
    /// 64-bit signed integers
    Integer,
    Boolean,
    /// Free text
    Text,
}

impl SemanticType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Identifier => "identifier",
            SemanticType::Category => "category",
            SemanticType::Timestamp => "timestamp",
            SemanticType::Date => "date",
            SemanticType::Numeric => "numeric",
            SemanticType::Integer => "integer",
            SemanticType::Boolean => "boolean",
            SemanticType::Text => "text",
        }
    }

    /// Parses a type name, accepting the usual aliases case-insensitively.
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name.trim().to_ascii_uppercase().as_str() {
            "ID" | "IDENTIFIER" | "KEY" => Ok(Self::Identifier),
            "CATEGORY" | "CATEGORICAL" | "FACTOR" => Ok(Self::Category),
            "DATETIME" | "TIMESTAMP" => Ok(Self::Timestamp),
            "DATE" => Ok(Self::Date),
            "FLOAT" | "DOUBLE" | "DECIMAL" | "NUMBER" | "NUMERIC" => Ok(Self::Numeric),
            "INT" | "BIGINT" | "INTEGER" => Ok(Self::Integer),
            "BOOL" | "BOOLEAN" => Ok(Self::Boolean),
            "TEXT" | "STRING" | "VARCHAR" => Ok(Self::Text),
            _ => Err(Error::InvalidArgument(format!("invalid column type '{name}'"))),
        }
    }

    /// Returns true if values of this type are compared against `min`/`max`.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Numeric | SemanticType::Integer)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SemanticType> for &'static str {
    fn from(kind: SemanticType) -> Self {
        kind.as_str()
    }
}

/// A named sequence of values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn with_values(&self, values: Vec<Value>) -> Self {
        Column::new(self.name.clone(), values)
    }
}
