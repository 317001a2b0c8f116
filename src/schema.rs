//! Table and column definitions plus CREATE TABLE text generation.
//!
//! Definitions are built once at startup and read-only afterwards.

use crate::value::{ColumnType, Value};

/// One table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default_value: Option<Value>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            not_null: false,
            unique: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// A column accepts null unless it is NOT NULL or a primary key.
    pub fn is_optional(&self) -> bool {
        !(self.not_null || self.primary_key)
    }

    fn render(&self) -> String {
        let mut out = format!("{} {}", self.name, self.column_type.sql_type());
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if self.unique {
            out.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            out.push_str(" DEFAULT ");
            out.push_str(&render_literal(default));
        }
        out
    }
}

/// Creation options for a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub if_not_exists: bool,
    pub temporary: bool,
    pub without_rowid: bool,
    pub strict: bool,
}

/// Schema for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub options: CreateOptions,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            options: CreateOptions::default(),
        }
    }

    /// Append a column. Column names must be unique within a definition.
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        assert!(
            !self.columns.iter().any(|c| c.name == column.name),
            "duplicate column `{}` in table `{}`",
            column.name,
            self.name
        );
        self.columns.push(column);
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.options.if_not_exists = true;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.options.temporary = true;
        self
    }

    pub fn without_rowid(mut self) -> Self {
        self.options.without_rowid = true;
        self
    }

    pub fn strict(mut self) -> Self {
        self.options.strict = true;
        self
    }

    pub fn column_def(&self, field: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == field)
    }

    pub fn column_type(&self, field: &str) -> Option<ColumnType> {
        self.column_def(field).map(|c| c.column_type)
    }

    /// Full CREATE TABLE statement for this definition.
    pub fn create_sql(&self) -> String {
        let mut sql = String::from("CREATE ");
        if self.options.temporary {
            sql.push_str("TEMPORARY ");
        }
        sql.push_str("TABLE ");
        if self.options.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.name);
        sql.push_str(" (");
        let cols: Vec<String> = self.columns.iter().map(ColumnDefinition::render).collect();
        sql.push_str(&cols.join(", "));
        sql.push(')');
        let mut suffixes = Vec::new();
        if self.options.without_rowid {
            suffixes.push("WITHOUT ROWID");
        }
        if self.options.strict {
            suffixes.push("STRICT");
        }
        if !suffixes.is_empty() {
            sql.push(' ');
            sql.push_str(&suffixes.join(", "));
        }
        sql
    }
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Boolean(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(b) => {
            let mut out = String::with_capacity(b.len() * 2 + 3);
            out.push_str("X'");
            for byte in b {
                out.push_str(&format!("{byte:02X}"));
            }
            out.push('\'');
            out
        }
    }
}
