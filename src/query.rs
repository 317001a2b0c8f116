//! Query descriptions and the deterministic SQL compiler.
//!
//! A [`Query`] is one self-contained database operation: a target table
//! and one [`Action`] variant owning everything it needs to compile.
//! Compilation is pure — the same query always yields the same SQL text
//! and the same positional argument order. Column lists for insert,
//! update, and upsert are alphabetical; filter placeholders appear in
//! filter order.

use std::collections::{BTreeMap, BTreeSet};

use crate::value::Value;

/// Predicate operators, each owning its operand.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Equals(Value),
    NotEquals(Value),
    Like(String),
    GreaterThan(Value),
    LessThan(Value),
    InSet(Vec<Value>),
}

/// One predicate term. Filters on a query are AND-joined in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Equals(value.into()))
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::NotEquals(value.into()))
    }

    /// The caller supplies LIKE wildcard characters.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Like(pattern.into()))
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::GreaterThan(value.into()))
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::LessThan(value.into()))
    }

    pub fn in_set(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOp::InSet(values))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One ordering term; list order is the tie-break order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortTerm {
    pub field: String,
    pub direction: SortDirection,
}

impl SortTerm {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// The supported database actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select {
        /// Projected columns; `None` selects `*`.
        fields: Option<Vec<String>>,
        filters: Vec<Filter>,
        sort: Vec<SortTerm>,
        limit: Option<u32>,
        offset: Option<u32>,
    },
    Insert {
        values: BTreeMap<String, Value>,
    },
    InsertMany {
        rows: Vec<BTreeMap<String, Value>>,
    },
    Update {
        values: BTreeMap<String, Value>,
        filters: Vec<Filter>,
    },
    Delete {
        filters: Vec<Filter>,
    },
    DeleteMany {
        field: String,
        ids: Vec<Value>,
    },
    Upsert {
        values: BTreeMap<String, Value>,
        conflict_columns: Vec<String>,
        /// Columns to overwrite on conflict; defaults to all value columns
        /// minus the conflict columns.
        update_columns: Option<Vec<String>>,
    },
}

/// One database operation against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub action: Action,
}

impl Query {
    pub fn new(table: impl Into<String>, action: Action) -> Self {
        Self {
            table: table.into(),
            action,
        }
    }

    /// Unfiltered, unsorted SELECT *.
    pub fn select_all(table: impl Into<String>) -> Self {
        Self::new(
            table,
            Action::Select {
                fields: None,
                filters: Vec::new(),
                sort: Vec::new(),
                limit: None,
                offset: None,
            },
        )
    }

    /// Compile to parameterized SQL text and its positional arguments.
    pub fn compile(&self) -> (String, Vec<Value>) {
        let mut args = Vec::new();
        let sql = match &self.action {
            Action::Select {
                fields,
                filters,
                sort,
                limit,
                offset,
            } => {
                let projection = match fields {
                    Some(fields) => fields.join(", "),
                    None => "*".to_string(),
                };
                let mut sql = format!("SELECT {} FROM {}", projection, self.table);
                push_where(&mut sql, filters, &mut args);
                if !sort.is_empty() {
                    let terms: Vec<String> = sort
                        .iter()
                        .map(|t| format!("{} {}", t.field, t.direction.sql()))
                        .collect();
                    sql.push_str(" ORDER BY ");
                    sql.push_str(&terms.join(", "));
                }
                if let Some(limit) = limit {
                    sql.push_str(&format!(" LIMIT {limit}"));
                }
                if let Some(offset) = offset {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
                sql
            }
            Action::Insert { values } => {
                let columns: Vec<&String> = values.keys().collect();
                for column in &columns {
                    args.push(values[*column].clone());
                }
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    self.table,
                    join_refs(&columns),
                    placeholders(columns.len())
                )
            }
            Action::InsertMany { rows } => {
                let columns: BTreeSet<&String> = rows.iter().flat_map(BTreeMap::keys).collect();
                let columns: Vec<&String> = columns.into_iter().collect();
                let group = format!("({})", placeholders(columns.len()));
                let groups = vec![group; rows.len()].join(", ");
                for row in rows {
                    for column in &columns {
                        args.push(row.get(*column).cloned().unwrap_or(Value::Null));
                    }
                }
                format!(
                    "INSERT INTO {} ({}) VALUES {}",
                    self.table,
                    join_refs(&columns),
                    groups
                )
            }
            Action::Update { values, filters } => {
                let assignments: Vec<String> =
                    values.keys().map(|c| format!("{c} = ?")).collect();
                for value in values.values() {
                    args.push(value.clone());
                }
                let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
                push_where(&mut sql, filters, &mut args);
                sql
            }
            Action::Delete { filters } => {
                let mut sql = format!("DELETE FROM {}", self.table);
                push_where(&mut sql, filters, &mut args);
                sql
            }
            Action::DeleteMany { field, ids } => {
                if ids.is_empty() {
                    format!("DELETE FROM {} WHERE 1 = 0", self.table)
                } else {
                    args.extend(ids.iter().cloned());
                    format!(
                        "DELETE FROM {} WHERE {} IN ({})",
                        self.table,
                        field,
                        placeholders(ids.len())
                    )
                }
            }
            Action::Upsert {
                values,
                conflict_columns,
                update_columns,
            } => {
                let columns: Vec<&String> = values.keys().collect();
                for column in &columns {
                    args.push(values[*column].clone());
                }
                let mut update: Vec<String> = match update_columns {
                    Some(explicit) => explicit.clone(),
                    None => values
                        .keys()
                        .filter(|c| !conflict_columns.contains(*c))
                        .cloned()
                        .collect(),
                };
                update.sort();
                let conflict_action = if update.is_empty() {
                    "DO NOTHING".to_string()
                } else {
                    let assignments: Vec<String> =
                        update.iter().map(|c| format!("{c} = excluded.{c}")).collect();
                    format!("DO UPDATE SET {}", assignments.join(", "))
                };
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
                    self.table,
                    join_refs(&columns),
                    placeholders(columns.len()),
                    conflict_columns.join(", "),
                    conflict_action
                )
            }
        };
        (sql, args)
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn join_refs(columns: &[&String]) -> String {
    columns
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_where(sql: &mut String, filters: &[Filter], args: &mut Vec<Value>) {
    if filters.is_empty() {
        return;
    }
    sql.push_str(" WHERE ");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        match &filter.op {
            FilterOp::Equals(v) => {
                sql.push_str(&format!("{} = ?", filter.field));
                args.push(v.clone());
            }
            FilterOp::NotEquals(v) => {
                sql.push_str(&format!("{} != ?", filter.field));
                args.push(v.clone());
            }
            FilterOp::Like(pattern) => {
                sql.push_str(&format!("{} LIKE ?", filter.field));
                args.push(Value::Text(pattern.clone()));
            }
            FilterOp::GreaterThan(v) => {
                sql.push_str(&format!("{} > ?", filter.field));
                args.push(v.clone());
            }
            FilterOp::LessThan(v) => {
                sql.push_str(&format!("{} < ?", filter.field));
                args.push(v.clone());
            }
            // An empty set can match nothing; emitting `IN ()` would be
            // a syntax error, so compile the always-false predicate.
            FilterOp::InSet(values) if values.is_empty() => sql.push_str("1 = 0"),
            FilterOp::InSet(values) => {
                sql.push_str(&format!("{} IN ({})", filter.field, placeholders(values.len())));
                args.extend(values.iter().cloned());
            }
        }
    }
}
