//! The per-entity record contract: table binding plus the default
//! algorithms between record instances and column/value maps.

use std::collections::BTreeMap;

use crate::convert;
use crate::decode::RowDecoder;
use crate::engine::RowData;
use crate::error::{ConvertError, DecodeError, StoreError};
use crate::schema::TableDefinition;
use crate::value::{FieldValue, Value};

/// Binds an entity type to its table name, unique-id field, schema, and a
/// hand-written field table (`to_values` / `from_row`). The field table
/// replaces runtime reflection: every field the schema declares is listed
/// explicitly, so record and table definition can be checked against each
/// other in tests.
pub trait Record: Sized {
    fn table_name() -> &'static str;

    fn id_field() -> &'static str {
        "id"
    }

    fn table_definition() -> TableDefinition;

    /// Field name to host value, for every persisted field.
    fn to_values(&self) -> BTreeMap<String, FieldValue>;

    /// Rebuild an instance from a decode context.
    fn from_row(row: &RowDecoder) -> Result<Self, DecodeError>;

    /// Convert every field to its storage value.
    ///
    /// Fields the table definition declares use the declared type and
    /// nullability; fields outside the definition fall back to inference,
    /// so records may carry extra schema-less fields without failing.
    fn to_storage_values(&self) -> Result<BTreeMap<String, Value>, ConvertError> {
        let definition = Self::table_definition();
        let mut out = BTreeMap::new();
        for (name, value) in self.to_values() {
            let stored = match definition.column_def(&name) {
                Some(column) => convert::to_storage_value(
                    &name,
                    &value,
                    column.column_type,
                    column.is_optional(),
                )?,
                None => {
                    let (inferred, optional) = convert::infer_type(&value);
                    convert::to_storage_value(&name, &value, inferred, optional)?
                }
            };
            out.insert(name, stored);
        }
        Ok(out)
    }

    /// Rebuild an instance from a fetched row, with decode failures
    /// wrapped in record-type and column context.
    fn from_storage(row: RowData) -> Result<Self, StoreError> {
        let columns = row.column_names().join(", ");
        let decoder = RowDecoder::from_row(row)
            .with_table_definition(Self::table_definition())
            .with_inference();
        Self::from_row(&decoder).map_err(|source| StoreError::RecordDecode {
            record_type: std::any::type_name::<Self>(),
            columns,
            source,
        })
    }

    /// Storage value of the unique-id field.
    fn id_value(&self) -> Result<Value, ConvertError> {
        let id_field = Self::id_field();
        let definition = Self::table_definition();
        let values = self.to_values();
        let value = values
            .get(id_field)
            .ok_or_else(|| ConvertError::MissingValue {
                field: id_field.to_string(),
            })?;
        match definition.column_def(id_field) {
            Some(column) => convert::to_storage_value(id_field, value, column.column_type, false),
            None => {
                let (inferred, _) = convert::infer_type(value);
                convert::to_storage_value(id_field, value, inferred, false)
            }
        }
    }
}
