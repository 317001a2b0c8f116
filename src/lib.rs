//! Typed record mapping and SQL generation over SQLite.
//!
//! # Intention
//!
//! - Convert between statically-typed records and SQLite storage values.
//! - Compile filter/sort/action descriptions to deterministic,
//!   parameterized SQL.
//! - Keep the engine surface narrow: one connection, synchronous
//!   read/write units, no internal transactions.
//!
//! # Architectural Boundaries
//!
//! - Only value conversion, schema/query description, SQL generation, and
//!   orchestration belong here.
//! - Transaction semantics, synchronization, and credential storage stay
//!   with the caller or the engine.

pub mod convert;
pub mod decode;
pub mod engine;
pub mod error;
pub mod manager;
pub mod query;
pub mod record;
pub mod schema;
pub mod value;

pub use decode::{FromValue, RowDecoder};
pub use engine::{RowData, SqliteEngine};
pub use error::{ConvertError, DecodeError, Result, StoreError};
pub use manager::Manager;
pub use query::{Action, Filter, FilterOp, Query, SortDirection, SortTerm};
pub use record::Record;
pub use schema::{ColumnDefinition, CreateOptions, TableDefinition};
pub use value::{ColumnType, FieldValue, Value};
