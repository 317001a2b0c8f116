//! Bidirectional conversion between host field values and storage values.
//!
//! The write path (`to_storage_value`) is driven by a declared column type
//! and fails with a typed [`ConvertError`] on schema mismatch. The read
//! path is a family of coercion functions returning `Option` — absence of
//! a usable value is "no value", never an error; the decoder decides
//! whether that is fatal for the field at hand.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::ConvertError;
use crate::value::{ColumnType, FieldValue, Value};

/// Textual datetime patterns tried after numeric epochs and ISO-8601.
const DATETIME_PATTERNS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Infer a column type from a value's runtime shape.
///
/// Returns the matching type and whether the value looked optional (only a
/// null does). Containers and JSON classify as text since they are stored
/// as structured text. Used only when no table definition entry exists for
/// the field; a declared column type always wins over inference.
pub fn infer_type(value: &FieldValue) -> (ColumnType, bool) {
    match value {
        FieldValue::Null => (ColumnType::Text, true),
        FieldValue::Text(_) => (ColumnType::Text, false),
        FieldValue::Integer(_) => (ColumnType::Integer, false),
        FieldValue::Real(_) => (ColumnType::Real, false),
        FieldValue::Boolean(_) => (ColumnType::Boolean, false),
        FieldValue::DateTime(_) => (ColumnType::Date, false),
        FieldValue::Bytes(_) => (ColumnType::Blob, false),
        FieldValue::List(_) | FieldValue::Map(_) | FieldValue::Json(_) => {
            (ColumnType::Text, false)
        }
    }
}

/// Convert a host value to the storage value for its declared column type.
///
/// A null host value becomes `Value::Null` when the column is optional and
/// a [`ConvertError::MissingValue`] when it is not. Numeric columns widen
/// and narrow across the host's numeric kinds; everything else requires
/// the matching shape.
pub fn to_storage_value(
    field: &str,
    value: &FieldValue,
    column_type: ColumnType,
    optional: bool,
) -> Result<Value, ConvertError> {
    if matches!(value, FieldValue::Null) {
        return if optional {
            Ok(Value::Null)
        } else {
            Err(ConvertError::MissingValue {
                field: field.to_string(),
            })
        };
    }

    match column_type {
        ColumnType::Text => Ok(Value::Text(to_text(field, value)?)),
        ColumnType::Integer => match value {
            FieldValue::Integer(i) => Ok(Value::Integer(*i)),
            FieldValue::Real(f) => Ok(Value::Integer(*f as i64)),
            FieldValue::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
            FieldValue::DateTime(dt) => Ok(Value::Integer(dt.timestamp())),
            other => Err(incompatible(field, column_type, other)),
        },
        ColumnType::Real | ColumnType::Double | ColumnType::Numeric => match value {
            FieldValue::Real(f) => Ok(Value::Real(*f)),
            FieldValue::Integer(i) => Ok(Value::Real(*i as f64)),
            FieldValue::DateTime(dt) => Ok(Value::Real(datetime_to_epoch(dt))),
            other => Err(incompatible(field, column_type, other)),
        },
        ColumnType::Boolean => match value {
            FieldValue::Boolean(b) => Ok(Value::Boolean(*b)),
            other => Err(incompatible(field, column_type, other)),
        },
        ColumnType::Date => match value {
            FieldValue::DateTime(dt) => Ok(Value::Real(datetime_to_epoch(dt))),
            other => Err(incompatible(field, column_type, other)),
        },
        ColumnType::Blob => match value {
            FieldValue::Bytes(b) => Ok(Value::Blob(b.clone())),
            other => Err(incompatible(field, column_type, other)),
        },
        ColumnType::Any => Ok(match value {
            FieldValue::Text(s) => Value::Text(s.clone()),
            FieldValue::Integer(i) => Value::Integer(*i),
            FieldValue::Real(f) => Value::Real(*f),
            FieldValue::Boolean(b) => Value::Boolean(*b),
            FieldValue::Bytes(b) => Value::Blob(b.clone()),
            FieldValue::DateTime(dt) => Value::Real(datetime_to_epoch(dt)),
            other => Value::Text(to_text(field, other)?),
        }),
    }
}

/// Render a host value as column text. Strings pass through unchanged;
/// containers serialize to canonical JSON; scalar values stringify without
/// JSON quoting.
fn to_text(field: &str, value: &FieldValue) -> Result<String, ConvertError> {
    Ok(match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Real(f) => f.to_string(),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::DateTime(dt) => dt.to_rfc3339(),
        other => serde_json::to_string(&field_to_json(other)).map_err(|source| {
            ConvertError::Serialization {
                field: field.to_string(),
                source,
            }
        })?,
    })
}

fn incompatible(field: &str, expected: ColumnType, value: &FieldValue) -> ConvertError {
    ConvertError::Incompatible {
        field: field.to_string(),
        expected,
        actual: value.kind(),
    }
}

/// Recursive host-value to JSON mapping used for structured text.
pub fn field_to_json(value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Null => JsonValue::Null,
        FieldValue::Text(s) => JsonValue::String(s.clone()),
        FieldValue::Integer(i) => JsonValue::from(*i),
        FieldValue::Real(f) => {
            serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number)
        }
        FieldValue::Boolean(b) => JsonValue::Bool(*b),
        FieldValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
        FieldValue::Bytes(b) => JsonValue::Array(b.iter().map(|x| JsonValue::from(*x)).collect()),
        FieldValue::List(items) => JsonValue::Array(items.iter().map(field_to_json).collect()),
        FieldValue::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), field_to_json(v)))
                .collect(),
        ),
        FieldValue::Json(v) => v.clone(),
    }
}

pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Real(f) => Some(*f as i64),
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Real(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) | Value::Boolean(_) => None,
    }
}

/// Boolean coercion: native booleans, nonzero integers, and the textual
/// forms "true"/"false"/"1"/"0".
pub fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        Value::Integer(i) => Some(*i != 0),
        Value::Text(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") || s == "1" {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") || s == "0" {
                Some(false)
            } else {
                None
            }
        }
        Value::Null | Value::Real(_) | Value::Blob(_) => None,
    }
}

pub fn value_to_blob(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Blob(b) => Some(b.clone()),
        Value::Text(s) => Some(s.clone().into_bytes()),
        _ => None,
    }
}

/// Datetime coercion. Tries, in order: stored numeric epoch seconds,
/// numeric text, ISO-8601 text, space-separated date-time with and without
/// fractional seconds, date-only.
pub fn value_to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Integer(i) => DateTime::from_timestamp(*i, 0),
        Value::Real(f) => epoch_to_datetime(*f),
        Value::Text(s) => parse_datetime_text(s.trim()),
        Value::Null | Value::Blob(_) | Value::Boolean(_) => None,
    }
}

fn parse_datetime_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(epoch) = s.parse::<f64>() {
        return epoch_to_datetime(epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in DATETIME_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Epoch seconds with fraction, millisecond precision.
pub fn datetime_to_epoch(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 1000.0
}

fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}
