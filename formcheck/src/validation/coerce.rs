//! Conversions of loosely typed field values into comparable numbers and dates.
//!
//! Every conversion is total: values that cannot be read as the target type
//! yield `None` so the calling rule can report a readable message.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;

use crate::model::Value;

/// Reads a value as a finite number.
///
/// Dates and timestamps read as epoch milliseconds. `NaN` and infinities,
/// whether stored as floats or typed as text, are rejected.
pub(crate) fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Decimal(d) => d.to_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Date(d) => d.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis() as f64,
        Value::DateTime(dt) => dt.timestamp_millis() as f64,
        Value::Null | Value::Bool(_) | Value::Guid(_) | Value::List(_) | Value::Map(_) => {
            return None;
        }
    };
    n.is_finite().then_some(n)
}

/// Reads a value as a calendar day.
///
/// Integers are taken as epoch milliseconds.
pub(crate) fn to_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date_naive()),
        Value::String(s) => parse_date(s),
        Value::Int(ms) => DateTime::<Utc>::from_timestamp_millis(*ms).map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar day.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}
