use crate::spreadsheet::reference::index_to_reference;
use crate::table::Value;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use iso8601_duration::Duration as IsoDuration;

/// Storage type of a raw cell as declared by the container.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `1`/`0`
    Boolean,
    /// Plain numeric values
    Number,
    /// Date/time serial numbers from the 1900 epoch
    NumberDateTime1900,
    /// Date serial numbers from the 1900 epoch
    NumberDate1900,
    /// Time fractions under a 1900 workbook
    NumberTime1900,
    /// Date/time serial numbers from the 1904 epoch
    NumberDateTime1904,
    /// Date serial numbers from the 1904 epoch
    NumberDate1904,
    /// Time fractions under a 1904 workbook
    NumberTime1904,
    /// ISO 8601 date or date/time strings
    IsoDateTime,
    /// ISO 8601 duration strings (ODS time cells)
    IsoDuration,
    /// Text, already resolved from the shared string table where needed
    InlineString,
    /// Spreadsheet error values such as `#N/A`
    Error,
}

impl CellType {
    /// Maps built-in Excel number format IDs to date/time cell types.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Classifies a custom number format code by the date and time tokens
    /// outside quoted literals, escapes and bracketed sections.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single raw cell: position, storage type and the textual payload.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    pub(crate) value: String,
}

impl Cell {
    /// Excel-style reference such as `B7`.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    fn to_double(&self) -> Result<f64, String> {
        self.value.trim().parse::<f64>().map_err(|_| format!("parse '{}' to number failed", self.value))
    }

    /// Converts the payload to a loosely typed [`Value`].
    pub(crate) fn to_value(&self) -> Result<Value, String> {
        let value = match self.kind {
            CellType::Empty => Value::Empty,
            CellType::Boolean => Value::Bool(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => Value::Number(self.to_double()?),
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                let is_1904 = self.kind == CellType::NumberDateTime1904;
                Value::Timestamp(serial_to_datetime(self.to_double()?, is_1904)
                    .ok_or_else(|| format!("serial '{}' out of date range", self.value))?)
            }
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                let is_1904 = self.kind == CellType::NumberDate1904;
                let datetime = serial_to_datetime(self.to_double()?, is_1904)
                    .ok_or_else(|| format!("serial '{}' out of date range", self.value))?;
                // A date format on a value with a time part keeps the time.
                if datetime.time() == NaiveTime::MIN {
                    Value::Date(datetime.date())
                } else {
                    Value::Timestamp(datetime)
                }
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 => Value::Time(fraction_to_time(self.to_double()?)),
            CellType::IsoDateTime => parse_iso_datetime(&self.value)?,
            CellType::IsoDuration => {
                let duration = self.value.parse::<IsoDuration>()
                    .map_err(|_| format!("parse '{}' to iso8601 duration failed", self.value))?;
                let seconds = duration.day as f64 * 86_400f64
                    + duration.hour as f64 * 3_600f64
                    + duration.minute as f64 * 60f64
                    + duration.second as f64;
                Value::Time(fraction_to_time(seconds / 86_400f64))
            }
            CellType::InlineString => Value::Text(self.value.to_owned()),
            CellType::Error => Err(format!("error value '{}'", self.value))?,
        };
        Ok(value)
    }
}

/// Converts a spreadsheet serial number to a date/time.
///
/// The 1900 system counts the nonexistent 1900-02-29 (Lotus 1-2-3 leap year
/// bug), so serials below 60 are shifted by one day.
pub(crate) fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor() as i64;
    let offset = if is_1904 {
        1_462
    } else if days < 60 {
        1
    } else {
        0
    };
    let micros = ((serial - serial.floor()) * 86_400_000_000f64).round() as i64;
    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_signed(Duration::try_days(days.checked_add(offset)?)?)?
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::microseconds(micros))
}

/// Converts a day fraction to a time of day, wrapping whole days.
pub(crate) fn fraction_to_time(fraction: f64) -> NaiveTime {
    let micros = (fraction.rem_euclid(1.0) * 86_400_000_000f64).round() as i64;
    NaiveTime::MIN.overflowing_add_signed(Duration::microseconds(micros)).0
}

fn parse_iso_datetime(value: &str) -> Result<Value, String> {
    let trimmed = value.trim().trim_end_matches('Z');
    if trimmed.contains('T') {
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
            .map(Value::Timestamp)
            .map_err(|_| format!("parse '{value}' to timestamp failed"))
    } else {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| format!("parse '{value}' to date failed"))
    }
}
