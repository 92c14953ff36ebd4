//! The cart aggregate.

use crate::cart::composer::{compose, ConditionFilter};
use crate::cart::{
    CartContent, CartItem, CartPricing, Condition, ConditionType, ItemOptions, ItemPatch,
    ItemUpdate, LineItemPricing,
};
use crate::catalog::{Buyable, CatalogRegistry};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::events::{CartEvent, EventSink, NullSink};
use crate::format::PriceFormat;
use crate::ids::RowId;
use crate::storage::CartStorage;
use std::fmt;
use std::sync::Arc;
use turbo_cache::{Cache, SessionId};
use turbo_db::{MemoryRecordStore, RecordStore};

/// A shopping cart bound to a state store and a park store.
///
/// The cart holds no item state itself: every operation reads the active
/// instance from the state store and writes it back. Prices are computed
/// on demand.
///
/// # Example
///
/// ```rust,ignore
/// let cart = Cart::in_memory();
/// let shirt = cart.add(CartItem::new(1, "Shirt", 20.0, 2, ItemOptions::new())?)?;
/// cart.add_condition(Condition::new("VAT", ConditionType::Tax, ConditionTarget::CartSubtotal, "10%")?)?;
/// assert_eq!(cart.total()?, 44.0);
/// ```
pub struct Cart {
    instance: String,
    storage: CartStorage,
    cache: Cache,
    pub(crate) records: Arc<dyn RecordStore>,
    events: Arc<dyn EventSink>,
    catalog: CatalogRegistry,
    config: CartConfig,
    session: Option<SessionId>,
}

impl Cart {
    /// Create a cart over the given stores with the default configuration.
    pub fn new(cache: Cache, records: impl RecordStore + 'static) -> Self {
        let config = CartConfig::default();
        Self {
            instance: config.default_instance.clone(),
            storage: CartStorage::new(cache.clone(), config.key_prefix.clone()),
            cache,
            records: Arc::new(records),
            events: Arc::new(NullSink),
            catalog: CatalogRegistry::new(),
            config,
            session: None,
        }
    }

    /// Cart over a fresh in-memory state store and park store.
    pub fn in_memory() -> Self {
        Self::new(Cache::in_memory(), MemoryRecordStore::new())
    }

    /// Apply a configuration. Selects its default instance.
    pub fn with_config(mut self, config: CartConfig) -> Self {
        self.instance = config.default_instance.clone();
        self.config = config;
        self.rebuild_storage();
        self
    }

    /// Send notifications to `sink`.
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Arc::new(sink);
        self
    }

    /// Use `catalog` to resolve associated models.
    pub fn with_catalog(mut self, catalog: CatalogRegistry) -> Self {
        self.catalog = catalog;
        self
    }

    /// Scope every state key to a session.
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self.rebuild_storage();
        self
    }

    fn rebuild_storage(&mut self) {
        let prefix = match &self.session {
            Some(session) => session.scope(&self.config.key_prefix),
            None => self.config.key_prefix.clone(),
        };
        self.storage = CartStorage::new(self.cache.clone(), prefix);
    }

    /// Switch the active instance. Other instances keep their state.
    pub fn select_instance(&mut self, instance: impl Into<String>) -> &mut Self {
        let instance = instance.into();
        let instance = if instance.trim().is_empty() {
            self.config.default_instance.clone()
        } else {
            instance
        };
        tracing::debug!(from = %self.instance, to = %instance, "switching cart instance");
        self.instance = instance;
        self
    }

    /// Name of the active instance.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Instances with items in the state store.
    pub fn instances(&self) -> Result<Vec<String>, CartError> {
        self.storage.instances()
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    pub fn storage(&self) -> &CartStorage {
        &self.storage
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    // ---- items ----

    /// Add an item, merging its quantity into an existing line with the same
    /// row id. Returns the stored line.
    pub fn add(&self, mut item: CartItem) -> Result<CartItem, CartError> {
        if let Err(e) = item.validate() {
            tracing::warn!(instance = %self.instance, error = %e, "rejected item");
            return Err(e);
        }
        item.refresh_row_id();

        let mut content = self.storage.get(&self.instance)?;
        let stored = Self::fold_item(&mut content, item)?;

        tracing::debug!(
            instance = %self.instance,
            row_id = %stored.row_id,
            quantity = stored.quantity,
            "item added"
        );
        self.commit(
            &self.instance,
            &content,
            [CartEvent::Added {
                instance: self.instance.clone(),
                item: stored.clone(),
            }],
        )?;
        Ok(stored)
    }

    /// Add a catalog entity.
    pub fn add_buyable(
        &self,
        buyable: &dyn Buyable,
        quantity: i64,
        options: ItemOptions,
    ) -> Result<CartItem, CartError> {
        self.add(CartItem::from_buyable(buyable, quantity, options)?)
    }

    /// Add several items in one write. Nothing is added if any item is
    /// invalid or any merge overflows.
    pub fn add_many(
        &self,
        items: impl IntoIterator<Item = CartItem>,
    ) -> Result<Vec<CartItem>, CartError> {
        let mut content = self.storage.get(&self.instance)?;
        let mut added = Vec::new();
        for mut item in items {
            if let Err(e) = item.validate() {
                tracing::warn!(instance = %self.instance, error = %e, "rejected item");
                return Err(e);
            }
            item.refresh_row_id();
            added.push(Self::fold_item(&mut content, item)?);
        }

        tracing::debug!(instance = %self.instance, count = added.len(), "items added");
        let events = added.iter().map(|item| CartEvent::Added {
            instance: self.instance.clone(),
            item: item.clone(),
        });
        self.commit(&self.instance, &content, events)?;
        Ok(added)
    }

    /// Change a line's quantity or attributes.
    ///
    /// An attribute change can move the line to a new row id; if that row id
    /// is already taken the two lines merge by summing quantities. A
    /// resulting quantity of zero or less removes the line and returns
    /// `None`.
    pub fn update(
        &self,
        row_id: &RowId,
        update: impl Into<ItemUpdate>,
    ) -> Result<Option<CartItem>, CartError> {
        let mut content = self.storage.get(&self.instance)?;
        let Some(mut item) = content.get(row_id).cloned() else {
            tracing::warn!(instance = %self.instance, row_id = %row_id, "update of missing item");
            return Err(CartError::ItemNotFound(row_id.clone()));
        };

        match update.into() {
            ItemUpdate::Quantity(quantity) => item.quantity = quantity,
            ItemUpdate::Attributes(patch) => {
                if let Err(e) = item.apply_patch(&patch) {
                    tracing::warn!(instance = %self.instance, row_id = %row_id, error = %e, "rejected update");
                    return Err(e);
                }
            }
        }

        let moved = &item.row_id != row_id;
        if moved {
            if let Some(existing) = content.get(&item.row_id) {
                item.quantity = item
                    .quantity
                    .checked_add(existing.quantity)
                    .ok_or_else(|| CartError::validation("quantity overflow"))?;
            }
        }

        if item.quantity <= 0 {
            let mut events = vec![];
            for gone in [row_id, &item.row_id] {
                if content.remove(gone).is_some() {
                    events.push(CartEvent::Removed {
                        instance: self.instance.clone(),
                        row_id: gone.clone(),
                    });
                }
            }
            tracing::debug!(instance = %self.instance, row_id = %row_id, "item removed by update");
            self.commit(&self.instance, &content, events)?;
            return Ok(None);
        }

        if moved && content.contains(&item.row_id) {
            content.remove(row_id);
            content.upsert(item.clone());
        } else {
            content.replace(row_id, item.clone());
        }

        tracing::debug!(
            instance = %self.instance,
            row_id = %item.row_id,
            quantity = item.quantity,
            "item updated"
        );
        self.commit(
            &self.instance,
            &content,
            [CartEvent::Updated {
                instance: self.instance.clone(),
                item: item.clone(),
            }],
        )?;
        Ok(Some(item))
    }

    /// Remove a line.
    pub fn remove(&self, row_id: &RowId) -> Result<CartItem, CartError> {
        let mut content = self.storage.get(&self.instance)?;
        let Some(item) = content.remove(row_id) else {
            tracing::warn!(instance = %self.instance, row_id = %row_id, "remove of missing item");
            return Err(CartError::ItemNotFound(row_id.clone()));
        };

        tracing::debug!(instance = %self.instance, row_id = %row_id, "item removed");
        self.commit(
            &self.instance,
            &content,
            [CartEvent::Removed {
                instance: self.instance.clone(),
                row_id: row_id.clone(),
            }],
        )?;
        Ok(item)
    }

    /// Look up a line.
    pub fn get(&self, row_id: &RowId) -> Result<CartItem, CartError> {
        self.storage
            .get(&self.instance)?
            .get(row_id)
            .cloned()
            .ok_or_else(|| CartError::ItemNotFound(row_id.clone()))
    }

    /// Lines of the active instance, in insertion order.
    pub fn content(&self) -> Result<CartContent, CartError> {
        self.storage.get(&self.instance)
    }

    /// Sum of quantities.
    pub fn count(&self) -> Result<i64, CartError> {
        Ok(self.content()?.quantity())
    }

    /// Number of lines.
    pub fn count_rows(&self) -> Result<usize, CartError> {
        Ok(self.content()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CartError> {
        Ok(self.content()?.is_empty())
    }

    /// Lines matching `predicate`.
    pub fn search(
        &self,
        predicate: impl Fn(&CartItem) -> bool,
    ) -> Result<Vec<CartItem>, CartError> {
        Ok(self
            .content()?
            .into_iter()
            .filter(|item| predicate(item))
            .collect())
    }

    /// Drop the active instance's lines and cart conditions.
    pub fn destroy(&self) -> Result<(), CartError> {
        self.storage.remove(&self.instance)?;
        self.storage.remove_conditions(&self.instance)?;
        tracing::debug!(instance = %self.instance, "cart destroyed");
        self.events.notify(&CartEvent::Destroyed {
            instance: self.instance.clone(),
        });
        self.announce_save(&self.instance);
        Ok(())
    }

    /// Link a line to a registered catalog model.
    ///
    /// Fails with [`CartError::UnknownCollaborator`] if no model is
    /// registered under `model`.
    pub fn associate(&self, row_id: &RowId, model: &str) -> Result<CartItem, CartError> {
        if let Err(e) = self.catalog.resolve(model) {
            tracing::warn!(model, "unknown catalog model");
            return Err(e);
        }

        let mut content = self.storage.get(&self.instance)?;
        let item = content
            .get_mut(row_id)
            .ok_or_else(|| CartError::ItemNotFound(row_id.clone()))?;
        item.associated_model = Some(model.to_string());
        let item = item.clone();

        self.commit(
            &self.instance,
            &content,
            [CartEvent::Updated {
                instance: self.instance.clone(),
                item: item.clone(),
            }],
        )?;
        Ok(item)
    }

    /// The catalog entity behind a line, if it was associated with a model
    /// and the model still knows the identifier.
    pub fn associated(&self, row_id: &RowId) -> Result<Option<Arc<dyn Buyable>>, CartError> {
        let item = self.get(row_id)?;
        match &item.associated_model {
            Some(model) => Ok(self.catalog.resolve(model)?.find(&item.id)),
            None => Ok(None),
        }
    }

    // ---- cart conditions ----

    /// Add or replace (by name) a cart condition.
    ///
    /// An `order` of 0 places the condition after the current last one.
    pub fn add_condition(&self, mut condition: Condition) -> Result<Condition, CartError> {
        let mut conditions = self.storage.get_conditions(&self.instance)?;
        if condition.order == 0 {
            condition.order = conditions
                .iter()
                .map(|c| c.order)
                .max()
                .map_or(1, |last| last.saturating_add(1));
        }
        conditions.retain(|c| c.name != condition.name);
        conditions.push(condition.clone());
        conditions.sort_by_key(|c| c.order);

        tracing::debug!(
            instance = %self.instance,
            condition = %condition.name,
            order = condition.order,
            "condition added"
        );
        self.commit_conditions(
            &conditions,
            CartEvent::ConditionAdded {
                instance: self.instance.clone(),
                condition: condition.clone(),
            },
        )?;
        Ok(condition)
    }

    /// Remove a cart condition. Returns whether it existed.
    pub fn remove_condition(&self, name: &str) -> Result<bool, CartError> {
        let mut conditions = self.storage.get_conditions(&self.instance)?;
        let before = conditions.len();
        conditions.retain(|c| c.name != name);
        if conditions.len() == before {
            return Ok(false);
        }

        tracing::debug!(instance = %self.instance, condition = name, "condition removed");
        self.commit_conditions(
            &conditions,
            CartEvent::ConditionRemoved {
                instance: self.instance.clone(),
                name: name.to_string(),
            },
        )?;
        Ok(true)
    }

    /// Remove every cart condition. Item conditions are untouched.
    pub fn clear_conditions(&self) -> Result<(), CartError> {
        self.storage.remove_conditions(&self.instance)?;
        tracing::debug!(instance = %self.instance, "conditions cleared");
        self.events.notify(&CartEvent::ConditionsCleared {
            instance: self.instance.clone(),
        });
        self.announce_save(&self.instance);
        Ok(())
    }

    /// Cart conditions in execution order.
    pub fn conditions(&self) -> Result<Vec<Condition>, CartError> {
        self.storage.get_conditions(&self.instance)
    }

    pub fn condition(&self, name: &str) -> Result<Option<Condition>, CartError> {
        Ok(self.conditions()?.into_iter().find(|c| c.name == name))
    }

    pub fn conditions_by_type(
        &self,
        condition_type: &ConditionType,
    ) -> Result<Vec<Condition>, CartError> {
        Ok(self
            .conditions()?
            .into_iter()
            .filter(|c| c.is_type(condition_type))
            .collect())
    }

    // ---- item conditions ----

    /// Append a condition to a line's list.
    pub fn add_item_condition(
        &self,
        row_id: &RowId,
        condition: Condition,
    ) -> Result<Option<CartItem>, CartError> {
        let mut conditions = self.get(row_id)?.conditions;
        conditions.push(condition);
        self.update(row_id, ItemPatch::new().conditions(conditions))
    }

    /// Remove every condition named `name` from a line's list.
    pub fn remove_item_condition(
        &self,
        row_id: &RowId,
        name: &str,
    ) -> Result<Option<CartItem>, CartError> {
        let mut conditions = self.get(row_id)?.conditions;
        conditions.retain(|c| c.name != name);
        self.update(row_id, ItemPatch::new().conditions(conditions))
    }

    /// Empty a line's condition list.
    pub fn clear_item_conditions(&self, row_id: &RowId) -> Result<Option<CartItem>, CartError> {
        self.update(row_id, ItemPatch::new().conditions(Vec::new()))
    }

    // ---- pricing ----

    /// Sum of line subtotals with item conditions other than taxes.
    pub fn subtotal(&self) -> Result<f64, CartError> {
        Ok(self
            .content()?
            .iter()
            .map(CartItem::line_subtotal_ex_tax)
            .sum())
    }

    /// Sum of what every item condition added over its line.
    ///
    /// Includes non-tax item conditions such as discounts and fees.
    pub fn tax(&self) -> Result<f64, CartError> {
        Ok(self.content()?.iter().map(CartItem::conditions_total).sum())
    }

    /// Sum of line totals, before cart conditions.
    pub fn items_total(&self) -> Result<f64, CartError> {
        Ok(self.content()?.iter().map(CartItem::line_total).sum())
    }

    /// Line totals with the cart's subtotal conditions applied in order.
    pub fn total(&self) -> Result<f64, CartError> {
        let base = self.items_total()?;
        let conditions = self.conditions()?;
        Ok(compose(&conditions, &ConditionFilter::cart_subtotal(), base).amount)
    }

    /// Full breakdown of the active instance.
    pub fn pricing(&self) -> Result<CartPricing, CartError> {
        let content = self.content()?;
        let conditions = self.conditions()?;

        let line_items: Vec<LineItemPricing> = content.iter().map(LineItemPricing::from).collect();
        let subtotal: f64 = line_items.iter().map(|l| l.subtotal_ex_tax).sum();
        let tax: f64 = line_items.iter().map(LineItemPricing::conditions_total).sum();
        let items_total: f64 = line_items.iter().map(|l| l.total).sum();
        let composition = compose(&conditions, &ConditionFilter::cart_subtotal(), items_total);

        Ok(CartPricing {
            subtotal,
            tax,
            items_total,
            total: composition.amount,
            line_items,
            applied_conditions: composition.applied,
        })
    }

    pub fn subtotal_formatted(&self, format: Option<&PriceFormat>) -> Result<String, CartError> {
        Ok(self.price_format(format).format(self.subtotal()?))
    }

    pub fn tax_formatted(&self, format: Option<&PriceFormat>) -> Result<String, CartError> {
        Ok(self.price_format(format).format(self.tax()?))
    }

    pub fn total_formatted(&self, format: Option<&PriceFormat>) -> Result<String, CartError> {
        Ok(self.price_format(format).format(self.total()?))
    }

    fn price_format<'a>(&'a self, format: Option<&'a PriceFormat>) -> &'a PriceFormat {
        format.unwrap_or(&self.config.format)
    }

    // ---- persistence ----

    /// Write `content` to `instance`, then announce `events` and the save.
    pub(crate) fn commit(
        &self,
        instance: &str,
        content: &CartContent,
        events: impl IntoIterator<Item = CartEvent>,
    ) -> Result<(), CartError> {
        self.storage.put(instance, content)?;
        for event in events {
            self.events.notify(&event);
        }
        self.announce_save(instance);
        Ok(())
    }

    /// Merge `item` into `content` by row id, summing quantities.
    fn fold_item(content: &mut CartContent, item: CartItem) -> Result<CartItem, CartError> {
        match content.get_mut(&item.row_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| CartError::validation("quantity overflow"))?;
                Ok(existing.clone())
            }
            None => {
                content.push(item.clone());
                Ok(item)
            }
        }
    }

    fn commit_conditions(&self, conditions: &[Condition], event: CartEvent) -> Result<(), CartError> {
        self.storage.put_conditions(&self.instance, conditions)?;
        self.events.notify(&event);
        self.announce_save(&self.instance);
        Ok(())
    }

    fn announce_save(&self, instance: &str) {
        if self.config.emit_saved_event {
            self.events.notify(&CartEvent::Saved {
                instance: instance.to_string(),
            });
        }
    }

    pub(crate) fn notify(&self, event: CartEvent) {
        self.events.notify(&event);
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("instance", &self.instance)
            .field("storage", &self.storage)
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
