//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing an OwnerId where a RowId is expected.

use crate::cart::ItemOptions;
use crate::error::CartError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(RowId);
define_id!(OwnerId);

impl RowId {
    /// Derive the row identity of a cart line.
    ///
    /// Hashes the identifier followed by the options encoded with their keys
    /// sorted, so the order options were set in never changes the result.
    pub fn derive(id: &Identifier, options: &ItemOptions) -> Self {
        let canonical = serde_json::to_string(&options.canonical()).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(id.to_string().as_bytes());
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}

/// Catalog identifier of a purchasable: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Numeric identifier (e.g. a database key).
    Integer(i64),
    /// Textual identifier (e.g. a SKU).
    Text(String),
}

impl Identifier {
    /// Reject empty textual identifiers.
    pub fn validate(&self) -> Result<(), CartError> {
        match self {
            Identifier::Text(s) if s.trim().is_empty() => {
                Err(CartError::validation("identifier must not be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Read an identifier from a JSON number or string.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CartError> {
        let id = match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Identifier::Integer)
                .ok_or_else(|| CartError::validation(format!("identifier {n} is not an integer")))?,
            serde_json::Value::String(s) => Identifier::Text(s.clone()),
            other => {
                return Err(CartError::validation(format!(
                    "identifier must be a number or string, got {other}"
                )))
            }
        };
        id.validate()?;
        Ok(id)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Integer(i) => write!(f, "{i}"),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(i: i64) -> Self {
        Identifier::Integer(i)
    }
}

impl From<i32> for Identifier {
    fn from(i: i32) -> Self {
        Identifier::Integer(i as i64)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_display() {
        let id = RowId::new("abc");
        assert_eq!(format!("{}", id), "abc");
        assert_eq!(OwnerId::from("user-1").as_str(), "user-1");
    }

    #[test]
    fn test_row_id_ignores_option_order() {
        let a = ItemOptions::new().with("size", "L").with("color", "red");
        let b = ItemOptions::new().with("color", "red").with("size", "L");
        assert_eq!(
            RowId::derive(&Identifier::from(1), &a),
            RowId::derive(&Identifier::from(1), &b)
        );
    }

    #[test]
    fn test_row_id_depends_on_identifier_and_options() {
        let opts = ItemOptions::new().with("size", "L");
        let base = RowId::derive(&Identifier::from(1), &opts);
        assert_ne!(base, RowId::derive(&Identifier::from(2), &opts));
        assert_ne!(
            base,
            RowId::derive(&Identifier::from(1), &ItemOptions::new().with("size", "M"))
        );
        assert_ne!(base, RowId::derive(&Identifier::from(1), &ItemOptions::new()));
    }

    #[test]
    fn test_row_id_is_hex_sha256() {
        let id = RowId::derive(&Identifier::from("sku-1"), &ItemOptions::new());
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_identifier_serde_untagged() {
        assert_eq!(serde_json::to_value(Identifier::from(7)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(Identifier::from("a")).unwrap(), json!("a"));
        let parsed: Identifier = serde_json::from_value(json!("sku")).unwrap();
        assert_eq!(parsed, Identifier::Text("sku".into()));
    }

    #[test]
    fn test_identifier_from_json() {
        assert_eq!(Identifier::from_json(&json!(3)).unwrap(), Identifier::Integer(3));
        assert!(Identifier::from_json(&json!("")).is_err());
        assert!(Identifier::from_json(&json!(null)).is_err());
        assert!(Identifier::from_json(&json!(1.5)).is_err());
    }
}
