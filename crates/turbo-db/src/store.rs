//! Record store contract and the in-process implementation.

use crate::{DbError, StoredCart};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Durable storage for parked carts, keyed by identifier.
pub trait RecordStore {
    /// Check whether a record exists.
    fn exists(&self, identifier: &str) -> Result<bool, DbError>;

    /// Insert a new record. Fails with [`DbError::AlreadyExists`] if the
    /// identifier is taken.
    fn insert(&self, record: StoredCart) -> Result<(), DbError>;

    /// Replace the record stored under `identifier`. Fails with
    /// [`DbError::NotFound`] if there is none.
    fn update(&self, identifier: &str, record: StoredCart) -> Result<(), DbError>;

    /// Look up a record.
    fn find(&self, identifier: &str) -> Result<Option<StoredCart>, DbError>;

    /// Delete a record. Deleting a missing record is not an error.
    fn delete(&self, identifier: &str) -> Result<(), DbError>;
}

/// Record store held in process memory.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<HashMap<String, StoredCart>>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parked carts.
    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredCart>>, DbError> {
        self.records
            .lock()
            .map_err(|_| DbError::QueryError("record store lock poisoned".to_string()))
    }
}

impl RecordStore for MemoryRecordStore {
    fn exists(&self, identifier: &str) -> Result<bool, DbError> {
        Ok(self.lock()?.contains_key(identifier))
    }

    fn insert(&self, record: StoredCart) -> Result<(), DbError> {
        let mut records = self.lock()?;
        if records.contains_key(&record.identifier) {
            return Err(DbError::AlreadyExists(record.identifier));
        }
        tracing::trace!(identifier = %record.identifier, "record inserted");
        records.insert(record.identifier.clone(), record);
        Ok(())
    }

    fn update(&self, identifier: &str, mut record: StoredCart) -> Result<(), DbError> {
        let mut records = self.lock()?;
        let existing = records
            .get(identifier)
            .ok_or_else(|| DbError::NotFound(identifier.to_string()))?;
        record.identifier = identifier.to_string();
        record.created_at = existing.created_at;
        record.touch();
        records.insert(identifier.to_string(), record);
        Ok(())
    }

    fn find(&self, identifier: &str) -> Result<Option<StoredCart>, DbError> {
        Ok(self.lock()?.get(identifier).cloned())
    }

    fn delete(&self, identifier: &str) -> Result<(), DbError> {
        if self.lock()?.remove(identifier).is_some() {
            tracing::trace!(identifier, "record deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, content: &str) -> StoredCart {
        StoredCart::new(id, "default", content)
    }

    #[test]
    fn test_insert_and_find() {
        let store = MemoryRecordStore::new();
        store.insert(record("user-1", "[]")).unwrap();

        let found = store.find("user-1").unwrap().unwrap();
        assert_eq!(found.instance, "default");
        assert_eq!(found.content, "[]");
        assert!(store.exists("user-1").unwrap());
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = MemoryRecordStore::new();
        store.insert(record("user-1", "[]")).unwrap();
        let err = store.insert(record("user-1", "[1]")).unwrap_err();
        assert!(matches!(err, DbError::AlreadyExists(id) if id == "user-1"));
        // Original content untouched
        assert_eq!(store.find("user-1").unwrap().unwrap().content, "[]");
    }

    #[test]
    fn test_update_replaces_content() {
        let store = MemoryRecordStore::new();
        store.insert(record("user-1", "[]")).unwrap();
        store
            .update("user-1", record("user-1", "[1]").with_owner(Some("u".into())))
            .unwrap();

        let found = store.find("user-1").unwrap().unwrap();
        assert_eq!(found.content, "[1]");
        assert_eq!(found.owner.as_deref(), Some("u"));
    }

    #[test]
    fn test_update_missing_fails() {
        let store = MemoryRecordStore::new();
        assert!(matches!(
            store.update("ghost", record("ghost", "[]")),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete() {
        let store = MemoryRecordStore::new();
        store.insert(record("user-1", "[]")).unwrap();
        store.delete("user-1").unwrap();
        assert!(store.is_empty());
        store.delete("user-1").unwrap();
    }
}
