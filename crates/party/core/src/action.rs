//! Actions submitted by the UI and the transition results they produce.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::PhaseId;

/// Optional data accompanying a dispatched action.
pub type Payload = Option<Value>;

/// Shallow patch applied to a module-local store when a transition commits.
///
/// Keys are overwritten; a `null` value removes the key.
pub type StorePatch = Map<String, Value>;

/// A named action routed to the active phase controller.
///
/// Action names are module-defined (`"start"`, `"add_player"`, ...). The
/// framework only requires them to be non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Outcome of a controller's `transition` for one action.
///
/// `next` may equal the current phase, which is a self-loop: the host merges
/// the effect but runs no enter/exit hooks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransitionResult {
    pub next: PhaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<StorePatch>,
}

impl PhaseTransitionResult {
    /// Move to `next`.
    pub fn to(next: impl Into<PhaseId>) -> Self {
        Self {
            next: next.into(),
            effect: None,
        }
    }

    /// Remain in `current`.
    pub fn stay(current: &PhaseId) -> Self {
        Self::to(current.clone())
    }

    pub fn with_effect(mut self, effect: StorePatch) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Adds a single key to the effect, creating it if needed.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.effect
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn is_self_loop(&self, current: &PhaseId) -> bool {
        &self.next == current
    }
}

/// Applies `patch` to `store` in place.
pub fn merge_patch(store: &mut Map<String, Value>, patch: &StorePatch) {
    for (key, value) in patch {
        if value.is_null() {
            store.remove(key);
        } else {
            store.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_and_removes() {
        let mut store = json!({"round": 1, "players": ["ana"], "stale": true})
            .as_object()
            .cloned()
            .unwrap();
        let patch = json!({"round": 2, "stale": null})
            .as_object()
            .cloned()
            .unwrap();

        merge_patch(&mut store, &patch);

        assert_eq!(
            Value::Object(store),
            json!({"round": 2, "players": ["ana"]})
        );
    }

    #[test]
    fn stay_is_a_self_loop() {
        let setup = PhaseId::from("setup");
        let result = PhaseTransitionResult::stay(&setup).with_value("round", 0);

        assert!(result.is_self_loop(&setup));
        assert_eq!(result.effect.unwrap().get("round"), Some(&json!(0)));
    }

    #[test]
    fn blank_actions_are_empty() {
        assert!(Action::new("  ").is_empty());
        assert!(!Action::new("start").is_empty());
    }
}
