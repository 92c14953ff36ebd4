//! Database error types.

use thiserror::Error;

/// Errors that can occur when using the record store.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database.
    #[error("Failed to open database: {0}")]
    OpenError(String),

    /// Failed to execute a query.
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// A stored row could not be decoded.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),

    /// A record with this identifier is already stored.
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// No record with this identifier.
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}
