//! Repository layer for data that outlives a single session.
//!
//! Stores are plain string key-value maps:
//! - [`InMemoryStore`] for tests and ephemeral sessions
//! - [`FileStore`] for one-file-per-key persistence on disk
//! - [`NamespacedStore`] to scope a shared store to one module

mod error;
mod file;
mod memory;
mod namespaced;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use namespaced::NamespacedStore;
pub use traits::{JsonStoreExt, KeyValueStore};
