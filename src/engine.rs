//! The SQLite engine handle: one connection behind a mutex, synchronous
//! read/write closures, and materialized row fetching.
//!
//! Thread-safety is this layer's contract with its callers: the mutex
//! serializes every read and write unit; there is no internal queueing,
//! cancellation, or timeout support.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params_from_iter, Connection};
use tracing::trace;

use crate::error::{Result, StoreError};
use crate::value::Value;

/// One fetched row, detached from the connection: ordered column names
/// plus a column→value map.
#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    columns: Vec<String>,
    values: BTreeMap<String, Value>,
}

impl RowData {
    pub fn new(columns: Vec<String>, values: BTreeMap<String, Value>) -> Self {
        Self { columns, values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }
}

/// Engine handle owning one SQLite connection.
#[derive(Debug)]
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a read unit against the connection.
    pub fn read<T>(&self, body: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        body(&self.lock())
    }

    /// Run a write unit against the connection. Writes serialize on the
    /// same mutex as reads.
    pub fn write<T>(&self, body: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        body(&self.lock())
    }

    /// Execute one statement, returning the affected row count.
    pub fn execute(&self, sql: &str, args: &[Value]) -> Result<usize> {
        trace!(sql, params = args.len(), "execute");
        self.write(|conn| Ok(conn.execute(sql, params_from_iter(args.iter()))?))
    }

    /// Fetch all rows for a statement, materialized as [`RowData`].
    pub fn fetch_rows(&self, sql: &str, args: &[Value]) -> Result<Vec<RowData>> {
        trace!(sql, params = args.len(), "fetch");
        self.read(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
            let mut rows = stmt.query(params_from_iter(args.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = BTreeMap::new();
                for (i, name) in columns.iter().enumerate() {
                    values.insert(name.clone(), Value::from_sql_ref(row.get_ref(i)?));
                }
                out.push(RowData::new(columns.clone(), values));
            }
            Ok(out)
        })
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        self.read(|conn| {
            let mut stmt =
                conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")?;
            Ok(stmt.exists([name])?)
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

static DEFAULT_ENGINE: Mutex<Option<Arc<SqliteEngine>>> = Mutex::new(None);

/// Install the process-wide default engine. Intended to be called once at
/// startup; a second call replaces the previous default.
pub fn init_default(engine: SqliteEngine) {
    *guard() = Some(Arc::new(engine));
}

/// Drop the process-wide default engine.
pub fn shutdown_default() {
    *guard() = None;
}

/// The current default engine, if one has been initialized.
pub fn default_engine() -> Result<Arc<SqliteEngine>> {
    guard().clone().ok_or(StoreError::EngineUnavailable)
}

fn guard() -> std::sync::MutexGuard<'static, Option<Arc<SqliteEngine>>> {
    match DEFAULT_ENGINE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
