//! String identifiers used throughout the framework.
//!
//! Each identifier is a distinct type so a phase id can never be passed where
//! a module id is expected. All of them serialize as plain strings.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Unique identifier of a registered game module (e.g. `"blamegame"`).
    ModuleId
);

string_id!(
    /// Name of one state in a module's phase machine (e.g. `"intro"`).
    PhaseId
);

string_id!(
    /// Key of a renderable screen provided by a module.
    ScreenId
);

impl From<&PhaseId> for ScreenId {
    /// Phases without an explicit screen render the screen of the same name.
    fn from(phase: &PhaseId) -> Self {
        Self(phase.as_str().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = ModuleId::new("blamegame");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"blamegame\"");

        let phase: PhaseId = serde_json::from_str("\"intro\"").unwrap();
        assert_eq!(phase, "intro");
    }

    #[test]
    fn screen_defaults_to_phase_name() {
        let phase = PhaseId::from("summary");
        assert_eq!(ScreenId::from(&phase).as_str(), "summary");
    }
}
