//! Renderable screens registered by a module.

use std::collections::BTreeMap;
use std::sync::Arc;

use party_core::{ModuleId, PhaseId, ScreenId};

use super::assets::Translator;
use super::context::StoreMap;

/// Read-only view handed to a screen when it renders.
#[derive(Debug, Clone, Copy)]
pub struct ScreenView<'a> {
    pub module_id: &'a ModuleId,
    pub phase: &'a PhaseId,
    pub store: &'a StoreMap,
    pub translator: Translator<'a>,
}

impl ScreenView<'_> {
    /// Translated text for `key`.
    pub fn t(&self, key: &str) -> String {
        self.translator.text(key)
    }
}

/// A module screen. Hosts decide how to present the rendered text.
pub trait Screen: Send + Sync {
    fn render(&self, view: &ScreenView<'_>) -> String;
}

impl<F> Screen for F
where
    F: Fn(&ScreenView<'_>) -> String + Send + Sync,
{
    fn render(&self, view: &ScreenView<'_>) -> String {
        self(view)
    }
}

/// Screen id → screen.
pub type ScreenMap = BTreeMap<ScreenId, Arc<dyn Screen>>;
