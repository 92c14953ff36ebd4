//! Cart pricing breakdown.

use crate::cart::composer::AppliedCondition;
use crate::cart::item::CartItem;
use crate::format::PriceFormat;
use crate::ids::RowId;
use serde::{Deserialize, Serialize};

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Sum of line subtotals excluding tax conditions.
    pub subtotal: f64,
    /// Sum of every item-level condition delta.
    pub tax: f64,
    /// Sum of line totals before cart conditions.
    pub items_total: f64,
    /// Final total after cart conditions.
    pub total: f64,
    /// Per-line breakdown, in cart order.
    pub line_items: Vec<LineItemPricing>,
    /// Cart conditions in execution order.
    pub applied_conditions: Vec<AppliedCondition>,
}

impl CartPricing {
    /// Total removed by subtractive cart conditions.
    pub fn savings(&self) -> f64 {
        self.applied_conditions
            .iter()
            .filter(|c| c.subtracts)
            .map(|c| c.calculated_value)
            .sum()
    }

    /// Check if any cart condition applied.
    pub fn has_conditions(&self) -> bool {
        !self.applied_conditions.is_empty()
    }

    /// Render the three headline amounts.
    pub fn formatted(&self, format: &PriceFormat) -> FormattedTotals {
        FormattedTotals {
            subtotal: format.format(self.subtotal),
            tax: format.format(self.tax),
            total: format.format(self.total),
        }
    }
}

/// Headline amounts as display strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedTotals {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// Pricing breakdown for a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemPricing {
    pub row_id: RowId,
    pub unit_price: f64,
    pub quantity: i64,
    /// Unit price after item conditions other than taxes.
    pub price_ex_tax: f64,
    /// Unit price after every item condition.
    pub price_with_conditions: f64,
    /// `price_ex_tax * quantity`.
    pub subtotal_ex_tax: f64,
    /// `price_with_conditions * quantity`.
    pub total: f64,
}

impl LineItemPricing {
    /// What the item conditions contributed over the whole line.
    pub fn conditions_total(&self) -> f64 {
        self.total - self.unit_price * self.quantity as f64
    }
}

impl From<&CartItem> for LineItemPricing {
    fn from(item: &CartItem) -> Self {
        let price_ex_tax = item.price_ex_tax();
        let price_with_conditions = item.price_with_conditions();
        let quantity = item.quantity as f64;
        Self {
            row_id: item.row_id.clone(),
            unit_price: item.price,
            quantity: item.quantity,
            price_ex_tax,
            price_with_conditions,
            subtotal_ex_tax: price_ex_tax * quantity,
            total: price_with_conditions * quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::condition::{Condition, ConditionTarget, ConditionType};
    use crate::cart::item::ItemOptions;

    #[test]
    fn test_line_pricing_from_item() {
        let item = CartItem::new(1, "Shirt", 10.0, 3, ItemOptions::new())
            .unwrap()
            .with_condition(
                Condition::new("vat", ConditionType::Tax, ConditionTarget::Item, "20%").unwrap(),
            );
        let line = LineItemPricing::from(&item);

        assert!((line.subtotal_ex_tax - 30.0).abs() < 1e-9);
        assert!((line.total - 36.0).abs() < 1e-9);
        assert!((line.conditions_total() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_savings_and_formatting() {
        let pricing = CartPricing {
            subtotal: 1000.0,
            tax: 0.0,
            items_total: 1000.0,
            total: 900.0,
            line_items: vec![],
            applied_conditions: vec![AppliedCondition {
                name: "sale".into(),
                condition_type: ConditionType::Discount,
                order: 1,
                base: 1000.0,
                result: 900.0,
                calculated_value: 100.0,
                subtracts: true,
            }],
        };

        assert!(pricing.has_conditions());
        assert!((pricing.savings() - 100.0).abs() < 1e-9);
        let shown = pricing.formatted(&PriceFormat::default());
        assert_eq!(shown.subtotal, "1,000.00");
        assert_eq!(shown.total, "900.00");
    }
}
