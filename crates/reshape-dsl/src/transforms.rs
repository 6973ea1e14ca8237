//! Built-in transforms
//!
//! Pure value functions available to schema definitions by name. Values a
//! transform does not apply to pass through unchanged.

use crate::registry::TransformRegistry;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};

/// Register every built-in transform
pub fn register_builtins(registry: &mut TransformRegistry) {
    registry
        .register("uppercase", transform_uppercase)
        .register("lowercase", transform_lowercase)
        .register("trim", transform_trim)
        .register("to_string", transform_to_string)
        .register("to_number", transform_to_number)
        .register("timestamp", transform_timestamp);
}

/// Convert string to uppercase
#[must_use]
pub fn transform_uppercase(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other.clone(),
    }
}

/// Convert string to lowercase
#[must_use]
pub fn transform_lowercase(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}

/// Trim whitespace from string
#[must_use]
pub fn transform_trim(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

/// Render scalars as strings; arrays and objects become compact JSON
#[must_use]
pub fn transform_to_string(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Null => value.clone(),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
    }
}

/// Parse numeric strings into numbers
#[must_use]
pub fn transform_to_number(value: &Value) -> Value {
    let Value::String(s) = value else {
        return value.clone();
    };

    let trimmed = s.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::Number(integer.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| value.clone(), Value::Number)
}

/// Normalize a point in time to an RFC 3339 UTC string.
///
/// Accepts epoch milliseconds (as a number or numeric string), RFC 3339
/// timestamps, and `YYYY-MM-DD` dates (taken as midnight UTC).
#[must_use]
pub fn transform_timestamp(value: &Value) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => parse_timestamp(s.trim()),
        _ => None,
    };

    match parsed {
        Some(at) => Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => {
            tracing::trace!(value = %value, "Value is not a recognizable timestamp");
            value.clone()
        }
    }
}

fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|at| at.and_utc());
    }
    input
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}
