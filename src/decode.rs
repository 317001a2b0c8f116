//! Direct row decoding: map a row's columns straight onto typed fields
//! without an intermediate generic document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::convert;
use crate::engine::RowData;
use crate::error::DecodeError;
use crate::schema::TableDefinition;
use crate::value::{ColumnType, Value};

/// Types decodable from a single storage value.
///
/// Implementations accept their direct storage shape first and then the
/// same-family coercions (integer widths, numeric-to-numeric, textual
/// booleans, the textual date formats). `None` means "no usable value",
/// which the decoder reports as a type mismatch for required fields.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_string(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_i64(value)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_i64(value).and_then(|i| i.try_into().ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_f64(value)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_f64(value).map(|f| f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_bool(value)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_blob(value)
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        convert::value_to_datetime(value)
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Keyed decode context over one row.
///
/// Built from either a raw field map or a fetched [`RowData`], optionally
/// paired with a table definition; [`with_inference`](Self::with_inference)
/// enables per-field type inference for columns the definition does not
/// declare. Nested and sequence data never decodes directly — it arrives
/// as structured text and goes through [`decode_json`](Self::decode_json).
#[derive(Debug, Clone)]
pub struct RowDecoder {
    values: BTreeMap<String, Value>,
    columns: Vec<String>,
    table: Option<TableDefinition>,
    infer: bool,
}

impl RowDecoder {
    pub fn from_values(values: BTreeMap<String, Value>) -> Self {
        let columns = values.keys().cloned().collect();
        Self {
            values,
            columns,
            table: None,
            infer: false,
        }
    }

    pub fn from_row(row: RowData) -> Self {
        let columns = row.column_names().to_vec();
        Self {
            values: row.into_values(),
            columns,
            table: None,
            infer: false,
        }
    }

    pub fn with_table_definition(mut self, table: TableDefinition) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_inference(mut self) -> Self {
        self.infer = true;
        self
    }

    /// Column names the source row offered, in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Present but null.
    pub fn is_nil(&self, field: &str) -> bool {
        self.values.get(field).is_some_and(Value::is_null)
    }

    /// Resolved column type for a field: the table definition's entry if
    /// one exists, otherwise (when inference is enabled) the type implied
    /// by the stored value itself.
    pub fn column_type(&self, field: &str) -> Option<ColumnType> {
        if let Some(declared) = self.table.as_ref().and_then(|t| t.column_type(field)) {
            return Some(declared);
        }
        if !self.infer {
            return None;
        }
        self.values.get(field).map(|v| match v {
            Value::Null | Value::Text(_) => ColumnType::Text,
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Real,
            Value::Blob(_) => ColumnType::Blob,
            Value::Boolean(_) => ColumnType::Boolean,
        })
    }

    /// Decode a required field.
    pub fn decode<T: FromValue>(&self, field: &str) -> Result<T, DecodeError> {
        let value = self.require(field, std::any::type_name::<T>())?;
        T::from_value(value).ok_or_else(|| DecodeError::TypeMismatch {
            field: field.to_string(),
            target: std::any::type_name::<T>(),
        })
    }

    /// Decode a nullable field; absent or null yields `None`.
    pub fn decode_opt<T: FromValue>(&self, field: &str) -> Result<Option<T>, DecodeError> {
        match self.values.get(field) {
            None => Ok(None),
            Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(value)
                .map(Some)
                .ok_or_else(|| DecodeError::TypeMismatch {
                    field: field.to_string(),
                    target: std::any::type_name::<T>(),
                }),
        }
    }

    /// Decode a required structured-text field into a deserializable type.
    pub fn decode_json<T: DeserializeOwned>(&self, field: &str) -> Result<T, DecodeError> {
        let value = self.require(field, std::any::type_name::<T>())?;
        let text = match value {
            Value::Text(s) => s,
            _ => {
                return Err(DecodeError::TypeMismatch {
                    field: field.to_string(),
                    target: std::any::type_name::<T>(),
                })
            }
        };
        serde_json::from_str(text).map_err(|source| DecodeError::Corrupted {
            field: field.to_string(),
            source,
        })
    }

    /// Nullable variant of [`decode_json`](Self::decode_json).
    pub fn decode_json_opt<T: DeserializeOwned>(
        &self,
        field: &str,
    ) -> Result<Option<T>, DecodeError> {
        match self.values.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.decode_json(field).map(Some),
        }
    }

    fn require(&self, field: &str, target: &'static str) -> Result<&Value, DecodeError> {
        match self.values.get(field) {
            None => Err(DecodeError::KeyNotFound {
                field: field.to_string(),
                target,
            }),
            Some(Value::Null) => Err(DecodeError::ValueNotFound {
                field: field.to_string(),
                target,
            }),
            Some(value) => Ok(value),
        }
    }
}
