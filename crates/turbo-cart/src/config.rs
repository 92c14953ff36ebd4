//! Cart configuration.

use crate::error::CartError;
use crate::format::PriceFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cart configuration, usually read from a `cart.toml` file.
///
/// ```toml
/// default_instance = "default"
/// key_prefix = "cart"
/// emit_saved_event = true
///
/// [format]
/// decimals = 2
/// decimal_point = "."
/// thousands_separator = ","
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Instance selected when a cart is opened.
    pub default_instance: String,
    /// Namespace for state store keys.
    pub key_prefix: String,
    /// Default price format for the `*_formatted` accessors.
    pub format: PriceFormat,
    /// Emit `cart.saved` after each state write.
    pub emit_saved_event: bool,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            default_instance: "default".to_string(),
            key_prefix: "cart".to_string(),
            format: PriceFormat::default(),
            emit_saved_event: true,
        }
    }
}

impl CartConfig {
    /// Parse from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, CartError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML (or `.json`) file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| CartError::Config(format!("failed to parse {}: {e}", path.display())))?;
            config.validate()?;
            Ok(config)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Set the default instance.
    pub fn with_default_instance(mut self, instance: impl Into<String>) -> Self {
        self.default_instance = instance.into();
        self
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the price format.
    pub fn with_format(mut self, format: PriceFormat) -> Self {
        self.format = format;
        self
    }

    /// Toggle the `cart.saved` notification.
    pub fn with_saved_event(mut self, emit: bool) -> Self {
        self.emit_saved_event = emit;
        self
    }

    fn validate(&self) -> Result<(), CartError> {
        if self.default_instance.trim().is_empty() {
            return Err(CartError::Config("default_instance must not be empty".into()));
        }
        if self.key_prefix.trim().is_empty() {
            return Err(CartError::Config("key_prefix must not be empty".into()));
        }
        Ok(())
    }
}
