//! Parking carts in the durable record store.

use crate::cart::{Cart, CartContent};
use crate::error::CartError;
use crate::events::CartEvent;
use crate::ids::OwnerId;
use crate::storage::{decode_content, encode_content};
use turbo_db::StoredCart;

impl Cart {
    /// Park the active instance under `identifier`.
    ///
    /// Fails with [`CartError::AlreadyStored`] if a cart is already parked
    /// under that identifier.
    pub fn park(&self, identifier: &str, owner: Option<&OwnerId>) -> Result<(), CartError> {
        if self.records.exists(identifier)? {
            tracing::warn!(identifier, "cart already stored");
            return Err(CartError::AlreadyStored(identifier.to_string()));
        }
        self.records.insert(self.snapshot(identifier, owner)?)?;

        tracing::info!(instance = %self.instance(), identifier, "cart stored");
        self.notify(CartEvent::Stored {
            instance: self.instance().to_string(),
            identifier: identifier.to_string(),
        });
        Ok(())
    }

    /// Park the active instance under `identifier`, replacing any cart
    /// already parked there.
    pub fn save(&self, identifier: &str, owner: Option<&OwnerId>) -> Result<(), CartError> {
        let record = self.snapshot(identifier, owner)?;
        if self.records.exists(identifier)? {
            self.records.update(identifier, record)?;
        } else {
            self.records.insert(record)?;
        }

        tracing::info!(instance = %self.instance(), identifier, "cart saved to record store");
        self.notify(CartEvent::Stored {
            instance: self.instance().to_string(),
            identifier: identifier.to_string(),
        });
        Ok(())
    }

    /// Load a parked cart back into the instance it was parked from.
    ///
    /// Parked lines overwrite live lines with the same row id; other live
    /// lines stay. The record is deleted afterwards. Returns `false` if
    /// nothing is parked under `identifier`.
    pub fn restore(&self, identifier: &str) -> Result<bool, CartError> {
        let Some(record) = self.records.find(identifier)? else {
            tracing::debug!(identifier, "nothing to restore");
            return Ok(false);
        };
        let parked = decode_content(&record.content)?;

        let mut content = self.storage().get(&record.instance)?;
        for item in parked {
            content.upsert(item);
        }
        self.commit(
            &record.instance,
            &content,
            [CartEvent::Restored {
                instance: record.instance.clone(),
                identifier: identifier.to_string(),
            }],
        )?;
        self.records.delete(identifier)?;

        tracing::info!(instance = %record.instance, identifier, "cart restored");
        Ok(true)
    }

    /// Delete a parked cart. Returns whether one existed.
    pub fn erase(&self, identifier: &str) -> Result<bool, CartError> {
        if !self.records.exists(identifier)? {
            return Ok(false);
        }
        self.records.delete(identifier)?;

        tracing::info!(identifier, "stored cart erased");
        self.notify(CartEvent::Erased {
            identifier: identifier.to_string(),
        });
        Ok(true)
    }

    /// Add a parked cart's lines to the active instance, summing quantities
    /// with existing lines. The record is kept. Returns `false` if nothing is
    /// parked under `identifier`.
    pub fn merge(&self, identifier: &str) -> Result<bool, CartError> {
        let Some(stored) = self.stored(identifier)? else {
            return Ok(false);
        };
        self.add_many(stored)?;

        tracing::info!(instance = %self.instance(), identifier, "stored cart merged");
        self.notify(CartEvent::Merged {
            instance: self.instance().to_string(),
            identifier: identifier.to_string(),
        });
        Ok(true)
    }

    /// Peek at a parked cart without restoring it.
    pub fn stored(&self, identifier: &str) -> Result<Option<CartContent>, CartError> {
        self.records
            .find(identifier)?
            .map(|record| decode_content(&record.content))
            .transpose()
    }

    fn snapshot(&self, identifier: &str, owner: Option<&OwnerId>) -> Result<StoredCart, CartError> {
        let content = encode_content(&self.content()?)?;
        Ok(StoredCart::new(identifier, self.instance(), content)
            .with_owner(owner.map(|o| o.to_string())))
    }
}
