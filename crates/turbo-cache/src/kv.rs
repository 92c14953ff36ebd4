//! Typed Key-Value cache with automatic serialization.

use crate::store::{KeyValueStore, MemoryStore};
use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Type-safe cache over any [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Clones share the same backend.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
}

impl Cache {
    /// Wrap an existing backend.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wrap a shared backend.
    pub fn from_shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Cache backed by a fresh process-local [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open the default Key-Value store.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_default()?;
    /// ```
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self::new(crate::store::SpinStore::open_default()?))
    }

    /// Open a named Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self::new(crate::store::SpinStore::open(name)?))
    }

    /// Open the default store. Outside Spin this is a process-local map.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self::in_memory())
    }

    /// Open a named store. Outside Spin this is a process-local map.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(_name: &str) -> Result<Self, CacheError> {
        Ok(Self::in_memory())
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let items: Option<Vec<CartItem>> = cache.get("cart:default")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        tracing::trace!(key, bytes = bytes.len(), "cache write");
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }

    /// Get all keys starting with `prefix`.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("cart", "wishlist");
/// // Returns "cart:wishlist"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
