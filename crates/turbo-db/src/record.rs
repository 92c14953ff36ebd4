//! Parked cart records.

use serde::{Deserialize, Serialize};

/// A cart snapshot parked under an opaque identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCart {
    /// Caller-chosen identifier (e.g. a user id or a share code).
    pub identifier: String,
    /// Cart instance the snapshot was taken from.
    pub instance: String,
    /// Serialized item collection. Opaque to the store.
    pub content: String,
    /// Owning user, if any.
    pub owner: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl StoredCart {
    /// Create a record stamped with the current time.
    pub fn new(
        identifier: impl Into<String>,
        instance: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = current_timestamp();
        Self {
            identifier: identifier.into(),
            instance: instance.into(),
            content: content.into(),
            owner: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the owning user.
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
