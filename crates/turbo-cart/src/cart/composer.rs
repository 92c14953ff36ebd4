//! Folding an ordered sequence of conditions over a base amount.

use crate::cart::condition::{Condition, ConditionTarget, ConditionType};
use serde::{Deserialize, Serialize};

/// Where the conditions come from, which decides their execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// An item's own list: executed in list order.
    Item,
    /// The cart's collection: executed in ascending `order`.
    Cart,
}

/// Selects which conditions take part in a composition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionFilter {
    pub target: ConditionTarget,
    pub exclude_type: Option<ConditionType>,
    pub scope: Scope,
}

impl ConditionFilter {
    /// Item-targeted conditions of an item's list.
    pub fn item() -> Self {
        Self {
            target: ConditionTarget::Item,
            exclude_type: None,
            scope: Scope::Item,
        }
    }

    /// Subtotal-targeted conditions of the cart's collection.
    pub fn cart_subtotal() -> Self {
        Self {
            target: ConditionTarget::CartSubtotal,
            exclude_type: None,
            scope: Scope::Cart,
        }
    }

    /// Leave out conditions of the given type.
    pub fn excluding(mut self, condition_type: ConditionType) -> Self {
        self.exclude_type = Some(condition_type);
        self
    }

    fn matches(&self, condition: &Condition) -> bool {
        condition.target == self.target
            && self
                .exclude_type
                .as_ref()
                .map_or(true, |excluded| !condition.is_type(excluded))
    }
}

/// One step of a composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCondition {
    pub name: String,
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub order: u32,
    /// Amount the condition was applied to.
    pub base: f64,
    /// Amount after the condition.
    pub result: f64,
    /// Unsigned amount added or removed, before clamping.
    pub calculated_value: f64,
    pub subtracts: bool,
}

impl AppliedCondition {
    /// The calculated value with its sign.
    pub fn signed_delta(&self) -> f64 {
        if self.subtracts {
            -self.calculated_value
        } else {
            self.calculated_value
        }
    }
}

/// Result of folding conditions over a base.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub base: f64,
    /// Final amount.
    pub amount: f64,
    /// Applied conditions in execution order.
    pub applied: Vec<AppliedCondition>,
    /// Sum of the signed calculated values.
    pub adjustment: f64,
}

impl Composition {
    /// Whether no condition matched.
    pub fn is_unchanged(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Fold the conditions selected by `filter` over `base`.
///
/// Each condition applies to the previous result, so percentage conditions
/// are order-sensitive. With nothing selected the amount is `base`.
pub fn compose<'a, I>(conditions: I, filter: &ConditionFilter, base: f64) -> Composition
where
    I: IntoIterator<Item = &'a Condition>,
{
    let mut selected: Vec<&Condition> = conditions
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();
    if filter.scope == Scope::Cart {
        selected.sort_by_key(|c| c.order);
    }

    let mut amount = base;
    let mut adjustment = 0.0;
    let mut applied = Vec::with_capacity(selected.len());
    for condition in selected {
        let step = condition.apply(amount);
        adjustment += step.signed_delta();
        applied.push(AppliedCondition {
            name: condition.name.clone(),
            condition_type: condition.condition_type.clone(),
            order: condition.order,
            base: amount,
            result: step.amount,
            calculated_value: step.calculated_value,
            subtracts: step.subtracts,
        });
        amount = step.amount;
    }

    Composition {
        base,
        amount,
        applied,
        adjustment,
    }
}
