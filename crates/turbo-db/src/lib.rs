//! Durable record store for parked TurboCommerce carts.
//!
//! A parked cart is a [`StoredCart`] record keyed by an opaque identifier.
//! [`MemoryRecordStore`] keeps records in process memory; on Spin (`wasm32`)
//! [`SqliteRecordStore`] keeps them in the `shoppingcart` SQLite table.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_db::{MemoryRecordStore, RecordStore, StoredCart};
//!
//! let store = MemoryRecordStore::new();
//! store.insert(StoredCart::new("user-42", "default", content))?;
//!
//! let parked = store.find("user-42")?;
//! ```

mod error;
mod record;
#[cfg(target_arch = "wasm32")]
mod sqlite;
mod store;
mod types;

pub use error::DbError;
pub use record::StoredCart;
#[cfg(target_arch = "wasm32")]
pub use sqlite::SqliteRecordStore;
pub use store::{MemoryRecordStore, RecordStore};
pub use types::Value;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, DbError, MemoryRecordStore, RecordStore, StoredCart, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use turbo_db::params;
///
/// let params = params!["cart-1", 42i64];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
