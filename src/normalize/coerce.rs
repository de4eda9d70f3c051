//! Per-value coercion to a declared semantic type.

use crate::normalize::report::Reason;
use crate::normalize::types::ColumnSpec;
use crate::spreadsheet::cell::serial_to_datetime;
use crate::table::SemanticType;
use crate::table::Value;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

/// Text layouts tried, in order, for timestamp columns
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Text layouts tried, in order, for date columns and date-only timestamps
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Coerces one value and checks the value constraints of `spec`.
///
/// Blank values coerce to [`Value::Empty`]; whether a blank is acceptable is
/// decided by the caller.
pub(crate) fn coerce(value: &Value, spec: &ColumnSpec) -> Result<Value, Reason> {
    if value.is_empty() {
        return Ok(Value::Empty);
    }
    let coerced = match spec.kind {
        SemanticType::Identifier => Value::Text(value.key()),
        SemanticType::Category => Value::Text(value.key()),
        SemanticType::Text => Value::Text(value.to_string()),
        SemanticType::Numeric => to_number(value).map(Value::Number).ok_or_else(|| mismatch(spec.kind, value))?,
        SemanticType::Integer => to_integer(value).map(Value::Integer).ok_or_else(|| mismatch(spec.kind, value))?,
        SemanticType::Boolean => to_bool(value).map(Value::Bool).ok_or_else(|| mismatch(spec.kind, value))?,
        SemanticType::Timestamp => to_timestamp(value, spec.format.as_deref())
            .map(Value::Timestamp)
            .ok_or_else(|| mismatch(spec.kind, value))?,
        SemanticType::Date => to_date(value, spec.format.as_deref())
            .map(Value::Date)
            .ok_or_else(|| mismatch(spec.kind, value))?,
    };
    check_constraints(&coerced, spec)?;
    Ok(coerced)
}

fn check_constraints(value: &Value, spec: &ColumnSpec) -> Result<(), Reason> {
    if spec.kind.is_numeric() {
        if let Some(number) = value.as_f64() {
            let below = spec.min.map(|min| number < min).unwrap_or(false);
            let above = spec.max.map(|max| number > max).unwrap_or(false);
            if below || above {
                return Err(Reason::OutOfRange {
                    value: number,
                    min: spec.min,
                    max: spec.max,
                });
            }
        }
    }
    if let (Some(allowed), Value::Text(label)) = (&spec.allowed, value) {
        if !allowed.iter().any(|candidate| candidate == label) {
            return Err(Reason::NotAllowed { value: label.to_owned() });
        }
    }
    Ok(())
}

fn mismatch(expected: SemanticType, value: &Value) -> Reason {
    Reason::TypeMismatch {
        expected,
        found: describe(expected, value),
    }
}

fn describe(expected: SemanticType, value: &Value) -> String {
    match value {
        Value::Text(text) if expected.is_numeric() => format!("non-numeric text '{text}'"),
        Value::Number(number) if expected == SemanticType::Integer => format!("fractional number {number}"),
        value => format!("{} '{}'", value.type_name(), value),
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => Some(*number),
        Value::Integer(number) => Some(*number as f64),
        Value::Text(text) => text.trim().parse::<f64>().ok().filter(|number| number.is_finite()),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(number) => Some(*number),
        Value::Text(text) if text.trim().parse::<i64>().is_ok() => text.trim().parse::<i64>().ok(),
        value => to_number(value)
            .filter(|number| number.fract() == 0.0 && number.abs() < i64::MAX as f64)
            .map(|number| number as i64),
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Integer(1) => Some(true),
        Value::Integer(0) => Some(false),
        Value::Number(number) if *number == 1.0 => Some(true),
        Value::Number(number) if *number == 0.0 => Some(false),
        Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_timestamp(value: &Value, format: Option<&str>) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(timestamp) => Some(*timestamp),
        Value::Date(date) => Some(date.and_time(NaiveTime::MIN)),
        Value::Number(serial) => serial_to_datetime(*serial, false),
        Value::Integer(serial) => serial_to_datetime(*serial as f64, false),
        Value::Text(text) => parse_timestamp(text.trim(), format),
        _ => None,
    }
}

fn to_date(value: &Value, format: Option<&str>) -> Option<NaiveDate> {
    match value {
        Value::Date(date) => Some(*date),
        Value::Text(text) => {
            let text = text.trim();
            format
                .and_then(|format| NaiveDate::parse_from_str(text, format).ok())
                .or_else(|| DATE_FORMATS.iter().find_map(|format| NaiveDate::parse_from_str(text, format).ok()))
                .or_else(|| parse_timestamp(text, format).filter(|it| it.time() == NaiveTime::MIN).map(|it| it.date()))
        }
        // A date column does not silently drop a time of day
        value => to_timestamp(value, format)
            .filter(|timestamp| timestamp.time() == NaiveTime::MIN)
            .map(|timestamp| timestamp.date()),
    }
}

fn parse_timestamp(text: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let parse = |format: &str| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(text, format).ok().map(|date| date.and_time(NaiveTime::MIN)))
    };
    format
        .and_then(parse)
        .or_else(|| DATETIME_FORMATS.iter().find_map(|format| parse(format)))
        .or_else(|| DATE_FORMATS.iter().find_map(|format| parse(format)))
}
