//! Errors returned by the table engine. Every failure is returned to the immediate caller; nothing
//! is retried or swallowed internally.

use thiserror::Error;

use crate::value::ValueKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The table was never synced, or has been deleted since.
    /// Check that the name of the table is correct, or create it with `sync`.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// An insert or update would have produced two rows with the same key value.
    #[error("duplicate key: {table}.{column}")]
    DuplicateKey { table: String, column: String },

    /// A single-row get matched no rows.
    #[error("row not found")]
    NotFound,

    /// The table schema cannot be turned into a row layout.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// The column's value kind has no ordering or summation rule for the requested operation.
    #[error("unsupported type: cannot {operation} column {column} of kind {kind}")]
    UnsupportedType { column: String, kind: ValueKind, operation: &'static str },

    #[error("column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    #[error("type mismatch for column {column}: expected {expected}, got {given}")]
    TypeMismatch { column: String, expected: ValueKind, given: ValueKind },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unsupported(column: &str, kind: ValueKind, operation: &'static str) -> Self {
        Error::UnsupportedType { column: column.to_string(), kind, operation }
    }

    pub(crate) fn column_not_found(table: &str, column: &str) -> Self {
        Error::ColumnNotFound { table: table.to_string(), column: column.to_string() }
    }
}
