//! Error types for the storage core.

use thiserror::Error;

use crate::value::ColumnType;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A host value could not be converted to its declared column type.
///
/// These are schema mismatches — the record handed us something its table
/// definition cannot hold. They surface as typed errors rather than
/// aborting, so callers can decide how loud to be.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A non-nullable field had no value.
    #[error("no value for non-nullable field `{field}`")]
    MissingValue { field: String },

    /// The value's shape cannot be stored under the declared column type.
    #[error("cannot store {actual} value in field `{field}` declared as {expected:?}")]
    Incompatible {
        field: String,
        expected: ColumnType,
        actual: &'static str,
    },

    /// Structured-text encoding of a container value failed.
    #[error("serialization error for field `{field}`: {source}")]
    Serialization {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A row field could not be decoded into its target type.
///
/// Every variant carries the field name and the target type name so a
/// failure points at the exact record field involved.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The field is entirely absent from the source row.
    #[error("field `{field}` not found in row (target type {target})")]
    KeyNotFound { field: String, target: &'static str },

    /// The field is present but null, and the target is non-nullable.
    #[error("field `{field}` is null but target type {target} is not nullable")]
    ValueNotFound { field: String, target: &'static str },

    /// The field holds a value that cannot coerce to the target type.
    #[error("field `{field}` cannot be converted to {target}")]
    TypeMismatch { field: String, target: &'static str },

    /// The field holds structured text that failed to deserialize.
    #[error("field `{field}` holds corrupted structured text: {source}")]
    Corrupted {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error for manager and engine operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create_table` without `if_not_exists` hit an existing table.
    #[error("table `{0}` already exists")]
    TableExists(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A whole-record decode failed; carries the record type and the
    /// columns the row actually offered.
    #[error("failed to decode {record_type} from row with columns [{columns}]: {source}")]
    RecordDecode {
        record_type: &'static str,
        columns: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// No default engine has been initialized.
    #[error("no engine available: call engine::init_default first")]
    EngineUnavailable,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
