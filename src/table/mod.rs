//! In-memory table: ordered, uniquely named columns of equal length.

mod column;
mod value;

pub use column::Column;
pub use column::SemanticType;
pub use value::Value;

use crate::error::Error;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

/// Borrowed view of one row of a [`Table`].
#[derive(Copy, Clone, Debug)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Data row position (0-based, header excluded).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table.column(column).and_then(|column| column.get(self.index))
    }

    pub fn values(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let index = self.index;
        self.table.columns.iter().filter_map(move |column| column.get(index))
    }
}

impl Table {
    /// Builds a table, checking that names are unique and lengths agree.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !names.insert(column.name()) {
                return Err(Error::InvalidArgument(format!("duplicate column name '{}'", column.name())));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(column) = columns.iter().find(|column| column.len() != expected) {
                return Err(Error::RaggedColumns {
                    column: column.name().to_owned(),
                    expected,
                    found: column.len(),
                });
            }
        }
        Ok(Table {
            name: name.into(),
            columns,
        })
    }

    /// Name of the sheet the table was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name()).collect()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.columns.first().map(|column| column.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.height()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.height()).map(move |index| Row { table: self, index })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        self.slice(0..n)
    }

    /// Rows in `range`, clamped to the table height.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Table {
        let end = range.end.min(self.height());
        let start = range.start.min(end);
        self.select_rows(|row| (start..end).contains(&row))
    }

    /// Maps each key of `column` to the row holding it.
    ///
    /// Fails with [`Error::DuplicateKey`] when a key repeats or is blank.
    pub fn key_index(&self, column: &str) -> Result<HashMap<String, usize>> {
        let keys = self.column(column).ok_or_else(|| Error::UnknownColumn(column.to_owned()))?;
        let mut index = HashMap::with_capacity(keys.len());
        for (row, value) in keys.values().iter().enumerate() {
            if value.is_empty() {
                return Err(Error::DuplicateKey {
                    column: column.to_owned(),
                    key: String::new(),
                    first: row,
                    second: row,
                });
            }
            if let Some(first) = index.insert(value.key(), row) {
                return Err(Error::DuplicateKey {
                    column: column.to_owned(),
                    key: value.key(),
                    first,
                    second: row,
                });
            }
        }
        Ok(index)
    }

    /// Returns a new table with `f` applied to every value of one column.
    pub fn map_column<F>(&self, name: &str, mut f: F) -> Result<Table>
    where
        F: FnMut(&Value) -> Value,
    {
        let position = self.position(name).ok_or_else(|| Error::UnknownColumn(name.to_owned()))?;
        let mut columns = self.columns.clone();
        let mapped = columns[position].values().iter().map(&mut f).collect();
        columns[position] = columns[position].with_values(mapped);
        Ok(Table {
            name: self.name.clone(),
            columns,
        })
    }

    /// Returns a new table with a column computed from each row. An existing
    /// column of that name is replaced in place; otherwise it is appended.
    pub fn derive_column<F>(&self, name: &str, mut f: F) -> Table
    where
        F: FnMut(Row<'_>) -> Value,
    {
        let values: Vec<Value> = self.rows().map(&mut f).collect();
        let mut columns = self.columns.clone();
        let column = Column::new(name, values);
        match self.position(name) {
            Some(position) => columns[position] = column,
            None => columns.push(column),
        }
        Table {
            name: self.name.clone(),
            columns,
        }
    }

    /// Returns a new table without the given rows; out of range indexes are ignored.
    pub fn drop_rows(&self, rows: &[usize]) -> Table {
        let rows: HashSet<usize> = rows.iter().copied().collect();
        self.select_rows(|row| !rows.contains(&row))
    }

    fn select_rows<P>(&self, keep: P) -> Table
    where
        P: Fn(usize) -> bool,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = column
                    .values()
                    .iter()
                    .enumerate()
                    .filter(|(row, _)| keep(*row))
                    .map(|(_, value)| value.clone())
                    .collect();
                column.with_values(values)
            })
            .collect();
        Table {
            name: self.name.clone(),
            columns,
        }
    }
}
