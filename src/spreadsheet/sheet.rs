use crate::error::DecodeError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::options::LoadOptions;
use crate::table::Column;
use crate::table::Table;
use crate::table::Value;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Upper bound on the values a loaded table may hold
const MAX_TABLE_VALUES: usize = 1 << 26;

/// Raw cells of one sheet, collected in reading order together with the
/// bounds of the used area.
pub(crate) struct Sheet {
    pub(crate) name: String,
    pub(crate) cells: Vec<Cell>,
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Row the header sits on: the first row holding any cell.
    pub(crate) fn header_row(&self) -> Option<usize> {
        self.row_lower_bound
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|lower| col < lower).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Lays the cells out as a table: the header row names the columns and
    /// every later row up to the last used one becomes a data row.
    pub(crate) fn into_table(self, options: &LoadOptions) -> Result<Table, DecodeError> {
        let (Some(header_row), Some(row_upper), Some(col_lower), Some(col_upper)) = (
            self.row_lower_bound,
            self.row_upper_bound,
            self.col_lower_bound,
            self.col_upper_bound,
        ) else {
            return Table::new(self.name, Vec::new()).map_err(|e| DecodeError::Other(e.to_string()));
        };
        let width = col_upper - col_lower + 1;

        let mut header = vec![Value::Empty; width];
        let mut rows = BTreeMap::<usize, Vec<(usize, Value)>>::new();
        for cell in &self.cells {
            if options.before_row_lower_bound(cell.row) || !options.contains_col(cell.col) {
                continue;
            }
            let value = match cell.kind {
                CellType::InlineString if options.is_null_literal(&cell.value) => Value::Empty,
                CellType::Error if options.error_as_null => Value::Empty,
                CellType::Error => Err(DecodeError::CellError {
                    reference: cell.reference(),
                    value: cell.value.to_owned(),
                })?,
                _ => cell
                    .to_value()
                    .map_err(|message| DecodeError::Other(format!("{} at {}", message, cell.reference())))?,
            };
            let col = cell.col - col_lower;
            if cell.row == header_row {
                header[col] = value;
            } else {
                rows.entry(cell.row - header_row - 1).or_default().push((col, value));
            }
        }

        let height = if options.skip_empty_rows {
            rows.retain(|_, cells| cells.iter().any(|(_, value)| !value.is_empty()));
            rows.len()
        } else {
            row_upper - header_row
        };
        if width.checked_mul(height).map(|size| size > MAX_TABLE_VALUES).unwrap_or(true) {
            return Err(DecodeError::Unsupported(format!(
                "sheet '{}' spans {width} columns by {height} rows",
                self.name
            )));
        }

        let mut grid = vec![vec![Value::Empty; height]; width];
        for (position, (row, cells)) in rows.into_iter().enumerate() {
            let target = if options.skip_empty_rows { position } else { row };
            for (col, value) in cells {
                grid[col][target] = value;
            }
        }
        let columns = header_names(&header)
            .into_iter()
            .zip(grid)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Table::new(self.name, columns).map_err(|e| DecodeError::Other(e.to_string()))
    }
}

/// Turns header cells into unique column names: blanks become `column{N}`
/// (1-based position) and repeats get `.1`, `.2`, ... suffixes.
pub(crate) fn header_names(header: &[Value]) -> Vec<String> {
    let mut seen = HashMap::<String, usize>::new();
    let mut names = Vec::<String>::with_capacity(header.len());
    for (index, value) in header.iter().enumerate() {
        let base = match value {
            Value::Empty => format!("column{}", index + 1),
            value => value.to_string().trim().to_owned(),
        };
        let base = if base.is_empty() { format!("column{}", index + 1) } else { base };
        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }
    names
}
