//! Catalog capability.
//!
//! The cart never owns product data. It asks a [`Buyable`] for identity,
//! name and price when building a line, and resolves associated models by
//! name through a [`CatalogRegistry`].

mod product;

pub use product::{Product, ProductCatalog, ProductStatus, ProductVariant, VariantOption};

use crate::cart::ItemOptions;
use crate::error::CartError;
use crate::ids::Identifier;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Something that can be put in a cart.
///
/// Every accessor receives the options chosen for the line, so a product
/// can answer per variant.
pub trait Buyable {
    fn buyable_identifier(&self, options: &ItemOptions) -> Identifier;
    fn buyable_description(&self, options: &ItemOptions) -> String;
    fn buyable_price(&self, options: &ItemOptions) -> f64;
}

/// A source of buyables, looked up by identifier.
pub trait CatalogModel {
    fn find(&self, id: &Identifier) -> Option<Arc<dyn Buyable>>;
}

/// Catalog models registered by name.
#[derive(Clone, Default)]
pub struct CatalogRegistry {
    models: HashMap<String, Arc<dyn CatalogModel>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, model: Arc<dyn CatalogModel>) {
        self.models.insert(name.into(), model);
    }

    /// Builder form of [`CatalogRegistry::register`].
    pub fn with_model(mut self, name: impl Into<String>, model: Arc<dyn CatalogModel>) -> Self {
        self.register(name, model);
        self
    }

    /// Look up a model.
    ///
    /// Fails with [`CartError::UnknownCollaborator`] if nothing is registered
    /// under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CatalogModel>, CartError> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| CartError::UnknownCollaborator(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CatalogRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogRegistry")
            .field("models", &self.names())
            .finish()
    }
}
