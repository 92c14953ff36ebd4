//! Shopping cart module.
//!
//! Contains the condition engine (values, conditions, composer), cart items
//! and the cart aggregate with its park/restore operations.

mod cart;
mod composer;
mod condition;
mod content;
mod item;
mod parking;
mod pricing;
mod value;

pub use cart::Cart;
pub use composer::{compose, AppliedCondition, Composition, ConditionFilter, Scope};
pub use condition::{Condition, ConditionTarget, ConditionType};
pub use content::CartContent;
pub use item::{CartItem, ItemOptions, ItemPatch, ItemUpdate};
pub use pricing::{CartPricing, FormattedTotals, LineItemPricing};
pub use value::{Adjustment, ValueSpec};
