#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlite_orm::{
    ColumnDefinition, ColumnType, DecodeError, FieldValue, Record, RowDecoder, TableDefinition,
};

/// Fixture record used by the record and manager tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub rating: Option<i64>,
}

impl Note {
    pub fn new(id: &str, title: &str, epoch: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            created_at: DateTime::from_timestamp(epoch, 0).unwrap(),
            rating: None,
        }
    }
}

impl Record for Note {
    fn table_name() -> &'static str {
        "notes"
    }

    fn table_definition() -> TableDefinition {
        TableDefinition::new("notes")
            .column(ColumnDefinition::new("id", ColumnType::Text).primary_key())
            .column(ColumnDefinition::new("title", ColumnType::Text).not_null())
            .column(ColumnDefinition::new("created_at", ColumnType::Date))
            .column(ColumnDefinition::new("rating", ColumnType::Integer))
    }

    fn to_values(&self) -> BTreeMap<String, FieldValue> {
        BTreeMap::from([
            ("id".to_string(), FieldValue::from(self.id.clone())),
            ("title".to_string(), FieldValue::from(self.title.clone())),
            ("created_at".to_string(), FieldValue::DateTime(self.created_at)),
            ("rating".to_string(), FieldValue::from(self.rating)),
        ])
    }

    fn from_row(row: &RowDecoder) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.decode("id")?,
            title: row.decode("title")?,
            created_at: row.decode("created_at")?,
            rating: row.decode_opt("rating")?,
        })
    }
}
