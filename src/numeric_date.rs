//! NumericDate conversions: seconds since the Unix epoch as a JSON number,
//! mapped to and from `chrono::DateTime<Utc>`.
//!
//! Integer values are preferred and are what this crate produces; fractional
//! values are accepted on input and truncated toward the epoch.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Parse a JSON value as a NumericDate.
///
/// Returns `None` for non-numeric values and for timestamps outside the
/// representable range.
pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(seconds) = value.as_i64() {
        return Utc.timestamp_opt(seconds, 0).single();
    }
    let seconds = value.as_f64()?;
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((seconds - whole) * 1e9) as u32;
    Utc.timestamp_opt(whole as i64, nanos).single()
}

/// Render a date as an integer-seconds JSON number.
pub fn to_value(date: DateTime<Utc>) -> Value {
    Value::from(date.timestamp())
}
