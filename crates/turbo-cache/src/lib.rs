//! Type-safe Key-Value state store for TurboCommerce.
//!
//! Holds per-instance cart state between requests. On Spin (`wasm32`) the
//! cache talks to Spin's Key-Value Store; everywhere else it is backed by a
//! process-local [`MemoryStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::Cache;
//!
//! let cache = Cache::open_default()?;
//!
//! // Store a value
//! cache.set("cart:default", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Vec<CartItem>> = cache.get("cart:default")?;
//!
//! // Delete a value
//! cache.delete("cart:default")?;
//! ```

mod error;
mod kv;
mod session;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use session::SessionId;
#[cfg(target_arch = "wasm32")]
pub use store::SpinStore;
pub use store::{KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KeyValueStore, MemoryStore, SessionId};
}
