//! State store bridge for cart instances.
//!
//! Items of instance `wishlist` under prefix `cart` live at `cart:wishlist`,
//! its cart conditions at `cart:wishlist_conditions`.

use crate::cart::{CartContent, Condition};
use crate::error::CartError;
use turbo_cache::{cache_key, Cache};

/// Reads and writes the state of cart instances.
#[derive(Debug, Clone)]
pub struct CartStorage {
    cache: Cache,
    prefix: String,
}

impl CartStorage {
    pub fn new(cache: Cache, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    /// Key of an instance's items.
    pub fn items_key(&self, instance: &str) -> String {
        cache_key!(self.prefix.as_str(), instance)
    }

    /// Key of an instance's cart conditions.
    pub fn conditions_key(&self, instance: &str) -> String {
        cache_key!(self.prefix.as_str(), format!("{instance}_conditions"))
    }

    /// Items of an instance; empty if never written.
    pub fn get(&self, instance: &str) -> Result<CartContent, CartError> {
        Ok(self
            .cache
            .get::<CartContent>(&self.items_key(instance))?
            .unwrap_or_default())
    }

    /// Write an instance's items. An empty collection removes the key.
    pub fn put(&self, instance: &str, content: &CartContent) -> Result<(), CartError> {
        if content.is_empty() {
            return self.remove(instance);
        }
        Ok(self.cache.set(&self.items_key(instance), content)?)
    }

    pub fn has(&self, instance: &str) -> Result<bool, CartError> {
        Ok(self.cache.exists(&self.items_key(instance))?)
    }

    pub fn remove(&self, instance: &str) -> Result<(), CartError> {
        Ok(self.cache.delete(&self.items_key(instance))?)
    }

    /// Cart conditions of an instance; empty if never written.
    pub fn get_conditions(&self, instance: &str) -> Result<Vec<Condition>, CartError> {
        Ok(self
            .cache
            .get::<Vec<Condition>>(&self.conditions_key(instance))?
            .unwrap_or_default())
    }

    pub fn put_conditions(&self, instance: &str, conditions: &[Condition]) -> Result<(), CartError> {
        Ok(self.cache.set(&self.conditions_key(instance), conditions)?)
    }

    pub fn remove_conditions(&self, instance: &str) -> Result<(), CartError> {
        Ok(self.cache.delete(&self.conditions_key(instance))?)
    }

    /// Instances with items in the store. Session-scoped keys are skipped.
    pub fn instances(&self) -> Result<Vec<String>, CartError> {
        let prefix = format!("{}:", self.prefix);
        let mut instances: Vec<String> = self
            .cache
            .keys_with_prefix(&prefix)?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .filter(|name| !name.contains(':') && !name.ends_with("_conditions"))
            .collect();
        instances.sort();
        Ok(instances)
    }
}

/// Encode an item collection for the park store.
pub fn encode_content(content: &CartContent) -> Result<String, CartError> {
    Ok(serde_json::to_string(content)?)
}

/// Decode an item collection written by [`encode_content`].
pub fn decode_content(encoded: &str) -> Result<CartContent, CartError> {
    Ok(serde_json::from_str(encoded)?)
}
