use crate::spreadsheet::range::Range;
use serde::Deserialize;
use std::collections::HashSet;

/// Options controlling how a sheet is turned into a table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Restricts reading to a cell range; the first row inside it is the header.
    pub range: Option<Range>,

    /// Maximum number of data rows to read (header excluded).
    pub row_limit: Option<usize>,

    /// Literal strings read as blank values, matched after trimming.
    pub nulls: HashSet<String>,

    /// Drop data rows in which every cell is blank.
    pub skip_empty_rows: bool,

    /// Read spreadsheet error values (`#N/A`, `#DIV/0!`) as blank instead of failing.
    pub error_as_null: bool,
}

impl LoadOptions {
    /// Checks if a row would fall after the range end or beyond the row limit,
    /// given the row the header was found on.
    pub(crate) fn after_row_upper_bound(&self, row: usize, header_row: Option<usize>) -> bool {
        let is_out_of_bound = self.range
            .and_then(|range| range.row_upper_bound)
            .map(|row_upper_bound| row_upper_bound < row)
            .unwrap_or(false);
        let is_more_than_limit = header_row.zip(self.row_limit)
            .map(|(header_row, limit)| header_row + limit < row)
            .unwrap_or(false);
        is_out_of_bound || is_more_than_limit
    }

    pub(crate) fn before_row_lower_bound(&self, row: usize) -> bool {
        self.range
            .and_then(|range| range.row_lower_bound)
            .map(|row_lower_bound| row < row_lower_bound)
            .unwrap_or(false)
    }

    pub(crate) fn contains_col(&self, col: usize) -> bool {
        self.range.map(|range| range.contains_col(col)).unwrap_or(true)
    }

    pub(crate) fn is_null_literal(&self, text: &str) -> bool {
        !self.nulls.is_empty() && self.nulls.contains(text.trim())
    }
}
