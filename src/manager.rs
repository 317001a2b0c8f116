//! Manager orchestration: ties records, queries, and the engine together.

use std::sync::Arc;

use tracing::debug;

use crate::engine::{self, RowData, SqliteEngine};
use crate::error::{Result, StoreError};
use crate::query::{Action, Filter, Query, SortTerm};
use crate::record::Record;
use crate::schema::TableDefinition;

/// Entry point for record CRUD and raw query execution against one engine.
///
/// Stateless between calls: every operation compiles one [`Query`] and
/// hands it to the engine's read or write primitive in a single call.
#[derive(Debug)]
pub struct Manager {
    engine: Arc<SqliteEngine>,
}

impl Manager {
    pub fn new(engine: Arc<SqliteEngine>) -> Self {
        Self { engine }
    }

    /// Construct against the process-wide default engine.
    pub fn from_default() -> Result<Self> {
        Ok(Self::new(engine::default_engine()?))
    }

    pub fn engine(&self) -> &Arc<SqliteEngine> {
        &self.engine
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        self.engine.table_exists(name)
    }

    /// Create a table from its definition. Fails with
    /// [`StoreError::TableExists`] when the table exists and the
    /// definition did not request `if_not_exists`.
    pub fn create_table(&self, definition: &TableDefinition) -> Result<()> {
        if !definition.options.if_not_exists && self.table_exists(&definition.name)? {
            return Err(StoreError::TableExists(definition.name.clone()));
        }
        let sql = definition.create_sql();
        debug!(table = %definition.name, "creating table");
        self.engine.execute(&sql, &[])?;
        Ok(())
    }

    /// Insert one record.
    pub fn add<R: Record>(&self, record: &R) -> Result<()> {
        let values = record.to_storage_values()?;
        let query = Query::new(R::table_name(), Action::Insert { values });
        self.write(&query)?;
        Ok(())
    }

    /// Insert a batch of records with one statement.
    pub fn add_all<R: Record>(&self, records: &[R]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let rows = records
            .iter()
            .map(Record::to_storage_values)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let query = Query::new(R::table_name(), Action::InsertMany { rows });
        self.write(&query)?;
        Ok(())
    }

    /// Fetch records matching the given filters, in the given order.
    pub fn fetch<R: Record>(
        &self,
        filters: Vec<Filter>,
        sort: Vec<SortTerm>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<R>> {
        let query = Query::new(
            R::table_name(),
            Action::Select {
                fields: None,
                filters,
                sort,
                limit,
                offset,
            },
        );
        self.read(&query)?
            .into_iter()
            .map(R::from_storage)
            .collect()
    }

    /// Fetch every record of a type.
    pub fn fetch_all<R: Record>(&self) -> Result<Vec<R>> {
        self.fetch(Vec::new(), Vec::new(), None, None)
    }

    /// Delete one record by its id field.
    pub fn delete<R: Record>(&self, record: &R) -> Result<()> {
        let query = Query::new(
            R::table_name(),
            Action::Delete {
                filters: vec![Filter::new(
                    R::id_field(),
                    crate::query::FilterOp::Equals(record.id_value()?),
                )],
            },
        );
        self.write(&query)?;
        Ok(())
    }

    /// Delete a batch of records with one statement, keyed on the id field.
    pub fn delete_all<R: Record>(&self, records: &[R]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let ids = records
            .iter()
            .map(Record::id_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let query = Query::new(
            R::table_name(),
            Action::DeleteMany {
                field: R::id_field().to_string(),
                ids,
            },
        );
        self.write(&query)?;
        Ok(())
    }

    /// Compile and run a query through the engine's read primitive.
    pub fn read(&self, query: &Query) -> Result<Vec<RowData>> {
        let (sql, args) = query.compile();
        debug!(%sql, "read");
        self.engine.fetch_rows(&sql, &args)
    }

    /// Compile and run a query through the engine's write primitive,
    /// returning the affected row count.
    pub fn write(&self, query: &Query) -> Result<usize> {
        let (sql, args) = query.compile();
        debug!(%sql, "write");
        self.engine.execute(&sql, &args)
    }
}
