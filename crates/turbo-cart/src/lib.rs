//! Shopping cart and condition pricing engine for TurboCommerce.
//!
//! - **Cart**: line items keyed by a content-derived row id, merge-on-add,
//!   parallel instances (`default`, `wishlist`, ...)
//! - **Conditions**: discounts, fees and taxes on items or on the cart
//!   subtotal, chained in a user-controlled order
//! - **Parking**: snapshot a cart into a durable record store and restore it
//! - **Catalog**: `Buyable` capability for building lines from products
//!
//! State lives in a [`turbo_cache::Cache`]; parked carts in a
//! [`turbo_db::RecordStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cart::prelude::*;
//!
//! let cart = Cart::in_memory();
//! let shirt = cart.add(CartItem::new(1, "Shirt", 20.0, 2, ItemOptions::new())?)?;
//! assert_eq!(cart.subtotal()?, 40.0);
//!
//! cart.add_condition(Condition::new(
//!     "VAT",
//!     ConditionType::Tax,
//!     ConditionTarget::CartSubtotal,
//!     "10%",
//! )?)?;
//! assert_eq!(cart.total()?, 44.0);
//!
//! cart.park("user-42", None)?;
//! ```

pub mod error;
pub mod ids;

pub mod cart;
pub mod catalog;
pub mod config;
pub mod events;
pub mod format;
pub mod storage;

pub use cart::Cart;
pub use config::CartConfig;
pub use error::CartError;
pub use format::PriceFormat;
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CartError;
    pub use crate::ids::*;

    // Cart
    pub use crate::cart::{
        AppliedCondition, Cart, CartContent, CartItem, CartPricing, Condition, ConditionTarget,
        ConditionType, ItemOptions, ItemPatch, ItemUpdate, LineItemPricing, ValueSpec,
    };

    // Catalog
    pub use crate::catalog::{Buyable, CatalogModel, CatalogRegistry, Product, ProductCatalog};

    // Ambient
    pub use crate::config::CartConfig;
    pub use crate::events::{CartEvent, EventSink, NullSink, RecordingSink, TracingSink};
    pub use crate::format::PriceFormat;
}
