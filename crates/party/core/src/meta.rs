//! Bounded key-value data attached to content and completion events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MetaError;

/// Free-form extra data carried by an event.
///
/// The map is bounded to [`EventMeta::MAX_ENTRIES`] entries so observers can
/// rely on events staying small. Keys are kept sorted, which keeps the JSON
/// rendering of an event stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct EventMeta {
    entries: BTreeMap<String, Value>,
}

impl EventMeta {
    pub const MAX_ENTRIES: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    ///
    /// Replacing an existing key never fails; adding a new key fails once the
    /// map is full.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, MetaError> {
        let key = key.into();
        if key.is_empty() {
            return Err(MetaError::EmptyKey);
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= Self::MAX_ENTRIES {
            return Err(MetaError::TooManyEntries {
                max: Self::MAX_ENTRIES,
            });
        }
        Ok(self.entries.insert(key, value.into()))
    }

    /// Builder-style insert.
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, MetaError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<BTreeMap<String, Value>> for EventMeta {
    type Error = MetaError;

    fn try_from(entries: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        if entries.len() > Self::MAX_ENTRIES {
            return Err(MetaError::TooManyEntries {
                max: Self::MAX_ENTRIES,
            });
        }
        if entries.keys().any(|k| k.is_empty()) {
            return Err(MetaError::EmptyKey);
        }
        Ok(Self { entries })
    }
}

impl From<EventMeta> for BTreeMap<String, Value> {
    fn from(meta: EventMeta) -> Self {
        meta.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_new_keys_past_the_bound() {
        let mut meta = EventMeta::new();
        for i in 0..EventMeta::MAX_ENTRIES {
            meta.insert(format!("k{i}"), i).unwrap();
        }

        assert_eq!(
            meta.insert("overflow", 1),
            Err(MetaError::TooManyEntries {
                max: EventMeta::MAX_ENTRIES
            })
        );
        // Replacing an existing key is still allowed at capacity.
        assert!(meta.insert("k0", "replaced").is_ok());
        assert_eq!(meta.len(), EventMeta::MAX_ENTRIES);
    }

    #[test]
    fn empty_keys_are_rejected() {
        assert_eq!(EventMeta::new().insert("", 1), Err(MetaError::EmptyKey));
    }

    #[test]
    fn deserialize_enforces_the_bound() {
        let oversized: BTreeMap<String, Value> = (0..=EventMeta::MAX_ENTRIES)
            .map(|i| (format!("k{i}"), Value::from(i)))
            .collect();
        let json = serde_json::to_string(&oversized).unwrap();

        assert!(serde_json::from_str::<EventMeta>(&json).is_err());
        assert!(serde_json::from_str::<EventMeta>(r#"{"round":2}"#).is_ok());
    }
}
