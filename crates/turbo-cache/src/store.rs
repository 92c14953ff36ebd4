//! Raw byte-level Key-Value backends.

use crate::CacheError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A byte-oriented Key-Value store.
///
/// Implementations are plain synchronous calls. They provide no transactions:
/// a read followed by a write is not atomic, and callers that share a key
/// across writers own that hazard.
pub trait KeyValueStore {
    /// Get the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check whether `key` holds a value.
    fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// List every key in the store.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Process-local store backed by a `HashMap`.
///
/// Cloning shares the underlying map, so several `Cache` handles opened from
/// the same `MemoryStore` observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::StoreError("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.lock()?.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store backed by Spin's Key-Value Store.
#[cfg(target_arch = "wasm32")]
pub struct SpinStore {
    store: spin_sdk::key_value::Store,
}

#[cfg(target_arch = "wasm32")]
impl SpinStore {
    /// Open the default Key-Value store.
    pub fn open_default() -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open_default()
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self { store })
    }

    /// Open a named Key-Value store.
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open(name)
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self { store })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for SpinStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.store
            .get(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.store
            .set(key, value)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store
            .exists(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store
            .get_keys()
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get() {
        let store = MemoryStore::new();
        store.set("a", b"1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_memory_store_delete() {
        let store = MemoryStore::new();
        store.set("a", b"1").unwrap();
        store.delete("a").unwrap();
        assert!(!store.exists("a").unwrap());
        // Deleting again is fine
        store.delete("a").unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("shared", b"x").unwrap();
        assert!(other.exists("shared").unwrap());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_memory_store_keys_sorted() {
        let store = MemoryStore::new();
        store.set("b", b"").unwrap();
        store.set("a", b"").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
