//! Named price adjustments: discounts, fees and taxes.

use crate::cart::value::{Adjustment, ValueSpec};
use crate::error::CartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used to filter conditions.
///
/// Only [`ConditionType::Tax`] changes behavior: it is left out of the
/// ex-tax item prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionType {
    Tax,
    Discount,
    Fee,
    /// Any other label, e.g. `"shipping"` or `"coupon"`.
    Other(String),
}

impl ConditionType {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionType::Tax => "tax",
            ConditionType::Discount => "discount",
            ConditionType::Fee => "fee",
            ConditionType::Other(label) => label,
        }
    }
}

impl From<&str> for ConditionType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "tax" => ConditionType::Tax,
            "discount" => ConditionType::Discount,
            "fee" => ConditionType::Fee,
            _ => ConditionType::Other(s.to_string()),
        }
    }
}

impl From<String> for ConditionType {
    fn from(s: String) -> Self {
        ConditionType::from(s.as_str())
    }
}

impl From<ConditionType> for String {
    fn from(t: ConditionType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a condition applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionTarget {
    /// A single item's unit price.
    Item,
    /// The cart's aggregate subtotal.
    CartSubtotal,
}

impl ConditionTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionTarget::Item => "item",
            ConditionTarget::CartSubtotal => "subtotal",
        }
    }
}

impl FromStr for ConditionTarget {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "item" => Ok(ConditionTarget::Item),
            "subtotal" | "cart_subtotal" => Ok(ConditionTarget::CartSubtotal),
            other => Err(CartError::validation(format!(
                "invalid condition target: {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for ConditionTarget {
    type Error = CartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConditionTarget> for String {
    fn from(t: ConditionTarget) -> Self {
        t.as_str().to_string()
    }
}

/// A named price adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Name, unique among a cart's own conditions.
    pub name: String,
    /// Label used for filtering.
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    /// What the condition applies to.
    pub target: ConditionTarget,
    /// Adjustment, e.g. `"-10%"`.
    pub value: ValueSpec,
    /// Position among cart conditions; 0 means "append".
    #[serde(default)]
    pub order: u32,
    /// Free-form metadata (description, coupon code, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Condition {
    /// Create a condition.
    pub fn new(
        name: impl Into<String>,
        condition_type: impl Into<ConditionType>,
        target: ConditionTarget,
        value: &str,
    ) -> Result<Self, CartError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CartError::validation("condition name must not be empty"));
        }
        Ok(Self {
            name,
            condition_type: condition_type.into(),
            target,
            value: ValueSpec::parse(value)?,
            order: 0,
            attributes: serde_json::Map::new(),
        })
    }

    /// Build a condition from a raw attribute bundle with `name`, `type`,
    /// `target`, `value` and optional `order` and `attributes` keys.
    pub fn from_attributes(attrs: &serde_json::Value) -> Result<Self, CartError> {
        let field = |key: &str| -> Result<&str, CartError> {
            attrs
                .get(key)
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| CartError::validation(format!("condition {key} is required")))
        };
        let value = match attrs.get("value") {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => return Err(CartError::validation("condition value is required")),
        };

        let mut condition = Self::new(
            field("name")?,
            field("type")?,
            field("target")?.parse()?,
            &value,
        )?;
        if let Some(order) = attrs.get("order").and_then(serde_json::Value::as_u64) {
            condition.order = u32::try_from(order)
                .map_err(|_| CartError::validation(format!("condition order {order} is too large")))?;
        }
        if let Some(extra) = attrs.get("attributes").and_then(serde_json::Value::as_object) {
            condition.attributes = extra.clone();
        }
        Ok(condition)
    }

    /// Set the position among cart conditions.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Attach a metadata attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Apply to `base`.
    pub fn apply(&self, base: f64) -> Adjustment {
        self.value.apply(base)
    }

    /// The unsigned amount this condition adds or removes from `base`.
    pub fn calculated_value(&self, base: f64) -> f64 {
        self.apply(base).calculated_value
    }

    /// Check the condition's label.
    pub fn is_type(&self, condition_type: &ConditionType) -> bool {
        &self.condition_type == condition_type
    }
}
