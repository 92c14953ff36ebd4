//! Cart line items.

use crate::cart::composer::{compose, ConditionFilter};
use crate::cart::condition::{Condition, ConditionType};
use crate::catalog::Buyable;
use crate::error::CartError;
use crate::ids::{Identifier, RowId};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Attributes of a line such as size or color.
///
/// Keeps insertion order for display; identity uses the key-sorted form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemOptions(Vec<(String, serde_json::Value)>);

impl ItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ItemOptions::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set an option. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options keyed in lexicographic order.
    pub fn canonical(&self) -> BTreeMap<&str, &serde_json::Value> {
        self.iter().collect()
    }

    /// Read options from a JSON object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CartError> {
        match value {
            serde_json::Value::Null => Ok(Self::new()),
            serde_json::Value::Object(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            other => Err(CartError::validation(format!(
                "options must be an object, got {other}"
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for ItemOptions {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut options = Self::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

impl Serialize for ItemOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ItemOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = ItemOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of item options")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut options = ItemOptions::new();
                while let Some((k, v)) = access.next_entry::<String, serde_json::Value>()? {
                    options.insert(k, v);
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Identity derived from `id` and `options`.
    pub row_id: RowId,
    /// Catalog identifier.
    pub id: Identifier,
    /// Display name.
    pub name: String,
    /// Unit price before conditions.
    pub price: f64,
    pub quantity: i64,
    pub options: ItemOptions,
    /// Item-scoped conditions, executed in list order.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Catalog model this line was associated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_model: Option<String>,
}

impl CartItem {
    /// Create a line item from explicit fields.
    pub fn new(
        id: impl Into<Identifier>,
        name: impl Into<String>,
        price: f64,
        quantity: i64,
        options: ItemOptions,
    ) -> Result<Self, CartError> {
        let id = id.into();
        let name = name.into();
        id.validate()?;
        validate_name(&name)?;
        validate_price(price)?;
        validate_quantity(quantity)?;

        Ok(Self {
            row_id: RowId::derive(&id, &options),
            id,
            name,
            price,
            quantity,
            options,
            conditions: Vec::new(),
            associated_model: None,
        })
    }

    /// Create a line item from a catalog entity.
    pub fn from_buyable(
        buyable: &dyn Buyable,
        quantity: i64,
        options: ItemOptions,
    ) -> Result<Self, CartError> {
        Self::new(
            buyable.buyable_identifier(&options),
            buyable.buyable_description(&options),
            buyable.buyable_price(&options),
            quantity,
            options,
        )
    }

    /// Create a line item from a raw attribute bundle.
    ///
    /// Expects `id`, `name` and `price`; `quantity` (or `qty`) defaults to 1;
    /// `options` and `conditions` are optional.
    pub fn from_attributes(attrs: &serde_json::Value) -> Result<Self, CartError> {
        let id = Identifier::from_json(
            attrs
                .get("id")
                .ok_or_else(|| CartError::validation("item id is required"))?,
        )?;
        let name = attrs
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| CartError::validation("item name is required"))?;
        let price = attrs
            .get("price")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| CartError::validation("item price must be a number"))?;
        let quantity = match attrs.get("quantity").or_else(|| attrs.get("qty")) {
            None => 1,
            Some(q) => q
                .as_i64()
                .ok_or_else(|| CartError::validation(format!("invalid quantity: {q}")))?,
        };
        let options = ItemOptions::from_json(attrs.get("options").unwrap_or(&serde_json::Value::Null))?;
        let conditions = match attrs.get("conditions") {
            Some(serde_json::Value::Array(list)) => list
                .iter()
                .map(Condition::from_attributes)
                .collect::<Result<Vec<_>, _>>()?,
            Some(serde_json::Value::Object(_)) => {
                vec![Condition::from_attributes(&attrs["conditions"])?]
            }
            _ => Vec::new(),
        };

        let mut item = Self::new(id, name, price, quantity, options)?;
        item.conditions = conditions;
        Ok(item)
    }

    /// Append an item-scoped condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Recompute `row_id` from `id` and `options`.
    pub fn refresh_row_id(&mut self) {
        self.row_id = RowId::derive(&self.id, &self.options);
    }

    /// Check the fields a caller may have edited directly.
    pub fn validate(&self) -> Result<(), CartError> {
        self.id.validate()?;
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity)
    }

    /// Apply a patch. Everything is validated before anything changes.
    pub fn apply_patch(&mut self, patch: &ItemPatch) -> Result<(), CartError> {
        if let Some(id) = &patch.id {
            id.validate()?;
        }
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }

        if let Some(id) = &patch.id {
            self.id = id.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(options) = &patch.options {
            self.options = options.clone();
        }
        if let Some(conditions) = &patch.conditions {
            self.conditions = conditions.clone();
        }
        self.refresh_row_id();
        Ok(())
    }

    /// Unit price after every item condition.
    pub fn price_with_conditions(&self) -> f64 {
        compose(&self.conditions, &ConditionFilter::item(), self.price).amount
    }

    /// Unit price after item conditions other than taxes.
    pub fn price_ex_tax(&self) -> f64 {
        compose(
            &self.conditions,
            &ConditionFilter::item().excluding(ConditionType::Tax),
            self.price,
        )
        .amount
    }

    /// `price * quantity`, no conditions.
    pub fn line_subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// `price_ex_tax() * quantity`.
    pub fn line_subtotal_ex_tax(&self) -> f64 {
        self.price_ex_tax() * self.quantity as f64
    }

    /// `price_with_conditions() * quantity`.
    pub fn line_total(&self) -> f64 {
        self.price_with_conditions() * self.quantity as f64
    }

    /// What the item conditions added (or removed, when negative) over the line.
    pub fn conditions_total(&self) -> f64 {
        self.line_total() - self.line_subtotal()
    }
}

/// Changes to apply to a line through [`crate::Cart::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub id: Option<Identifier>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub options: Option<ItemOptions>,
    pub conditions: Option<Vec<Condition>>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<Identifier>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn options(mut self, options: ItemOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = Some(conditions);
        self
    }
}

/// Either a bare quantity or a patch of identity/price fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemUpdate {
    Quantity(i64),
    Attributes(ItemPatch),
}

impl From<i64> for ItemUpdate {
    fn from(quantity: i64) -> Self {
        ItemUpdate::Quantity(quantity)
    }
}

impl From<ItemPatch> for ItemUpdate {
    fn from(patch: ItemPatch) -> Self {
        ItemUpdate::Attributes(patch)
    }
}

fn validate_name(name: &str) -> Result<(), CartError> {
    if name.trim().is_empty() {
        return Err(CartError::validation("item name must not be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), CartError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CartError::validation(format!("invalid price: {price}")));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> Result<(), CartError> {
    if quantity <= 0 {
        return Err(CartError::validation(format!("invalid quantity: {quantity}")));
    }
    Ok(())
}
