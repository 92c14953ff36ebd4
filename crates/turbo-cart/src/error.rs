//! Cart error types.

use crate::ids::RowId;
use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// Invalid identifier, name, price, quantity, condition target or value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Item not in the active cart instance.
    #[error("Item not in cart: {0}")]
    ItemNotFound(RowId),

    /// A catalog model reference could not be resolved.
    #[error("Unknown catalog model: {0}")]
    UnknownCollaborator(String),

    /// A cart is already parked under this identifier.
    #[error("A cart with identifier {0} was already stored")]
    AlreadyStored(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// State store error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Record store error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CartError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        CartError::Validation(message.into())
    }
}

impl From<turbo_db::DbError> for CartError {
    fn from(e: turbo_db::DbError) -> Self {
        match e {
            turbo_db::DbError::AlreadyExists(identifier) => CartError::AlreadyStored(identifier),
            other => CartError::Database(other.to_string()),
        }
    }
}

impl From<turbo_cache::CacheError> for CartError {
    fn from(e: turbo_cache::CacheError) -> Self {
        CartError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(e: toml::de::Error) -> Self {
        CartError::Config(e.to_string())
    }
}
