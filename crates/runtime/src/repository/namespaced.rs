//! Key-prefixing wrapper that scopes a shared store to one module.

use std::sync::Arc;

use super::error::Result;
use super::traits::KeyValueStore;

/// A view of a [`KeyValueStore`] where every key is prefixed with
/// `lof:{namespace}:`.
///
/// Two namespaces over the same backing store never see each other's keys.
#[derive(Clone)]
pub struct NamespacedStore {
    inner: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl NamespacedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, namespace: impl AsRef<str>) -> Self {
        Self {
            inner,
            prefix: format!("lof:{}:", namespace.as_ref()),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

impl KeyValueStore for NamespacedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(&self.scoped(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(&self.scoped(key), value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(&self.scoped(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .inner
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&self.prefix).map(str::to_owned))
            .collect())
    }
}

impl std::fmt::Debug for NamespacedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespacedStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
