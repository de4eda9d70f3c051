use crate::error::Error;
use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::row_to_index;
use regex::Regex;
use serde::Deserialize;

/// Excel-style cell range with optional boundaries, all 0-based and inclusive.
///
/// `"B2:D10"` bounds both corners, `"B:D"` only columns, `"3:"` only the first
/// row, and a single reference such as `"C5"` fixes the top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Range {
    pub row_lower_bound: Option<usize>,
    pub row_upper_bound: Option<usize>,
    pub col_lower_bound: Option<usize>,
    pub col_upper_bound: Option<usize>,
}

impl Range {
    pub(crate) fn contains_col(&self, col: usize) -> bool {
        self.col_lower_bound.map(|lower| lower <= col).unwrap_or(true)
            && self.col_upper_bound.map(|upper| col <= upper).unwrap_or(true)
    }
}

impl TryFrom<&str> for Range {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern");
        let upper = value.trim().replace('$', "").to_ascii_uppercase();
        let captures = pattern
            .captures(upper.as_str())
            .ok_or_else(|| Error::InvalidArgument(format!("invalid range '{value}'")))?;
        let range = Range {
            col_lower_bound: captures.get(1).map(|matcher| matcher.as_str()).and_then(col_to_index),
            row_lower_bound: captures.get(2).map(|matcher| matcher.as_str()).and_then(row_to_index),
            col_upper_bound: captures.get(4).map(|matcher| matcher.as_str()).and_then(col_to_index),
            row_upper_bound: captures.get(5).map(|matcher| matcher.as_str()).and_then(row_to_index),
        };
        let inverted_rows = range.row_lower_bound.zip(range.row_upper_bound).map(|(l, u)| l > u).unwrap_or(false);
        let inverted_cols = range.col_lower_bound.zip(range.col_upper_bound).map(|(l, u)| l > u).unwrap_or(false);
        if inverted_rows || inverted_cols {
            return Err(Error::InvalidArgument(format!("inverted range '{value}'")));
        }
        Ok(range)
    }
}

impl TryFrom<String> for Range {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Range::try_from(value.as_str())
    }
}
