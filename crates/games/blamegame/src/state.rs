//! Typed view of the blame game's module store.

use party_core::StorePatch;
use runtime::{HookError, StoreMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rounds played when the `rounds` setting is absent.
pub const DEFAULT_ROUNDS: u64 = 3;

/// Minimum players needed to leave setup.
pub const MIN_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameState {
    #[serde(default)]
    pub players: Vec<String>,
    /// 1-based round in play; 0 before the game starts.
    #[serde(default)]
    pub round: u64,
    /// Rounds in this game, fixed when play begins.
    #[serde(default = "default_rounds")]
    pub rounds: u64,
}

fn default_rounds() -> u64 {
    DEFAULT_ROUNDS
}

impl Default for BlameState {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            round: 0,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl BlameState {
    pub fn from_store(store: &StoreMap) -> Result<Self, HookError> {
        serde_json::from_value(Value::Object(store.clone())).map_err(|e| {
            HookError::with_source("module store does not match the blame game state", e)
        })
    }

    /// The whole state as a store patch.
    pub fn to_patch(&self) -> StorePatch {
        let mut patch = StorePatch::new();
        patch.insert(
            "players".to_owned(),
            Value::Array(self.players.iter().cloned().map(Value::String).collect()),
        );
        patch.insert("round".to_owned(), Value::from(self.round));
        patch.insert("rounds".to_owned(), Value::from(self.rounds));
        patch
    }

    pub fn can_begin(&self) -> bool {
        self.players.len() >= MIN_PLAYERS
    }

    pub fn is_last_round(&self) -> bool {
        self.round >= self.rounds
    }

    /// Player who reads the prompt in the current round.
    pub fn reader(&self) -> Option<&str> {
        if self.players.is_empty() || self.round == 0 {
            return None;
        }
        let index = ((self.round - 1) % self.players.len() as u64) as usize;
        self.players.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default() {
        let state = BlameState::from_store(&StoreMap::new()).unwrap();
        assert_eq!(state, BlameState::default());
    }

    #[test]
    fn mistyped_store_is_rejected() {
        let mut store = StoreMap::new();
        store.insert("round".to_owned(), json!("three"));
        assert!(BlameState::from_store(&store).is_err());
    }

    #[test]
    fn reader_rotates_through_players() {
        let mut state = BlameState {
            players: vec!["ana".into(), "ben".into()],
            round: 1,
            ..BlameState::default()
        };
        assert_eq!(state.reader(), Some("ana"));
        state.round = 2;
        assert_eq!(state.reader(), Some("ben"));
        state.round = 3;
        assert_eq!(state.reader(), Some("ana"));
    }
}
