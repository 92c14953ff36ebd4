//! Products and variants, and an in-memory catalog of them.

use crate::cart::ItemOptions;
use crate::catalog::{Buyable, CatalogModel};
use crate::ids::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Not visible to customers.
    Draft,
    #[default]
    Active,
    /// Not visible, data preserved.
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Identifier,
    /// Stock keeping unit.
    pub sku: String,
    pub name: String,
    /// Price when no variant matches the chosen options.
    pub price: f64,
    pub status: ProductStatus,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Create an active product with no variants.
    pub fn new(
        id: impl Into<Identifier>,
        sku: impl Into<String>,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            name: name.into(),
            price,
            status: ProductStatus::Active,
            variants: Vec::new(),
        }
    }

    /// Add a variant.
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    /// Check if the product can be bought.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// First variant whose options all match the chosen ones.
    pub fn variant_for(&self, options: &ItemOptions) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.matches(options))
    }
}

impl Buyable for Product {
    fn buyable_identifier(&self, _options: &ItemOptions) -> Identifier {
        self.id.clone()
    }

    fn buyable_description(&self, options: &ItemOptions) -> String {
        match self.variant_for(options) {
            Some(variant) => format!("{} ({})", self.name, variant.build_name()),
            None => self.name.clone(),
        }
    }

    fn buyable_price(&self, options: &ItemOptions) -> f64 {
        self.variant_for(options)
            .map_or(self.price, |variant| variant.price)
    }
}

/// A product variant (e.g., size/color combination).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    pub sku: String,
    pub price: f64,
    /// Options that define this variant.
    pub options: Vec<VariantOption>,
}

impl ProductVariant {
    pub fn new(sku: impl Into<String>, price: f64) -> Self {
        Self {
            sku: sku.into(),
            price,
            options: Vec::new(),
        }
    }

    /// Add an option to this variant.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(VariantOption::new(name, value));
        self
    }

    /// Build the variant name from options.
    pub fn build_name(&self) -> String {
        if self.options.is_empty() {
            "Default".to_string()
        } else {
            self.options
                .iter()
                .map(|o| o.value.as_str())
                .collect::<Vec<_>>()
                .join(" / ")
        }
    }

    /// Whether every option of the variant is set to the same text in `options`.
    pub fn matches(&self, options: &ItemOptions) -> bool {
        self.options.iter().all(|o| {
            options
                .get(&o.name)
                .and_then(serde_json::Value::as_str)
                .is_some_and(|value| value == o.value)
        })
    }
}

/// A variant option (e.g., Size: Large).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VariantOption {
    /// Option name (e.g., "size").
    pub name: String,
    /// Option value (e.g., "L").
    pub value: String,
}

impl VariantOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Products held in memory, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<Identifier, Arc<Product>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), Arc::new(product));
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.insert(product);
        self
    }

    pub fn get(&self, id: &Identifier) -> Option<&Product> {
        self.products.get(id).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogModel for ProductCatalog {
    /// Only available products are found.
    fn find(&self, id: &Identifier) -> Option<Arc<dyn Buyable>> {
        self.products
            .get(id)
            .filter(|p| p.is_available())
            .map(|p| Arc::clone(p) as Arc<dyn Buyable>)
    }
}
