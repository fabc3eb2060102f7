//! Per-call context lent to module hooks and phase controllers.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use party_core::{Action, GameEvent, ModuleId, Payload, PhaseId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::events::{EventBus, PublishReport};

/// Module-local state as seen by controllers and screens.
pub type StoreMap = Map<String, Value>;

/// Configuration passed to every module through its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub locale: String,
    pub fallback_locale: String,
    /// Free-form per-module settings (`rounds`, timers, ...).
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_owned(),
            fallback_locale: "en".to_owned(),
            settings: BTreeMap::new(),
        }
    }
}

impl ModuleConfig {
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Reads a numeric setting, accepting numbers and numeric strings.
    pub fn setting_u64(&self, key: &str) -> Option<u64> {
        match self.settings.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

/// An action submitted through [`ModuleContext::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedAction {
    pub action: Action,
    pub payload: Payload,
}

/// FIFO of actions dispatched from inside hooks and controllers.
///
/// The host drains it after the transition in progress has completed, so a
/// module can never start a transition while another one is running.
#[derive(Debug, Clone, Default)]
pub struct DispatchQueue {
    pending: Arc<Mutex<VecDeque<QueuedAction>>>,
}

impl DispatchQueue {
    pub fn push(&self, action: Action, payload: Payload) {
        self.lock().push_back(QueuedAction { action, payload });
    }

    pub fn pop(&self) -> Option<QueuedAction> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns everything still queued.
    pub fn drain(&self) -> Vec<QueuedAction> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<QueuedAction>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Events held back while a transition is in progress.
///
/// The host publishes them only once the transition has committed: what the
/// module announced while leaving a phase goes out just before `PHASE/EXIT`,
/// and what it announced from `on_enter` just after `PHASE/ENTER`. An outbox
/// that is never published is dropped with the failed transition.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    events: Mutex<Vec<GameEvent>>,
}

impl Outbox {
    fn push(&self, event: GameEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Publishes the held events in the order they were announced.
    pub(crate) fn publish_to(self, bus: &EventBus) {
        let events = self.events.into_inner().unwrap_or_else(PoisonError::into_inner);
        for event in &events {
            bus.publish(event);
        }
    }
}

/// Everything a module may use during one hook or transition call.
///
/// The context borrows from the host for the duration of the call; modules
/// never own or store it.
#[derive(Clone, Copy)]
pub struct ModuleContext<'a> {
    module_id: &'a ModuleId,
    phase: &'a PhaseId,
    config: &'a ModuleConfig,
    event_bus: &'a EventBus,
    queue: &'a DispatchQueue,
    store: &'a StoreMap,
    player_id: Option<&'a str>,
    room_id: Option<&'a str>,
    outbox: Option<&'a Outbox>,
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        module_id: &'a ModuleId,
        phase: &'a PhaseId,
        config: &'a ModuleConfig,
        event_bus: &'a EventBus,
        queue: &'a DispatchQueue,
        store: &'a StoreMap,
    ) -> Self {
        Self {
            module_id,
            phase,
            config,
            event_bus,
            queue,
            store,
            player_id: None,
            room_id: None,
            outbox: None,
        }
    }

    pub fn with_player(mut self, player_id: Option<&'a str>) -> Self {
        self.player_id = player_id;
        self
    }

    pub fn with_room(mut self, room_id: Option<&'a str>) -> Self {
        self.room_id = room_id;
        self
    }

    pub(crate) fn deferred(mut self, outbox: &'a Outbox) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn module_id(&self) -> &'a ModuleId {
        self.module_id
    }

    /// Phase the call is made for.
    ///
    /// During `on_enter` this is the phase being entered.
    pub fn phase(&self) -> &'a PhaseId {
        self.phase
    }

    pub fn config(&self) -> &'a ModuleConfig {
        self.config
    }

    pub fn event_bus(&self) -> &'a EventBus {
        self.event_bus
    }

    pub fn store(&self) -> &'a StoreMap {
        self.store
    }

    pub fn player_id(&self) -> Option<&'a str> {
        self.player_id
    }

    pub fn room_id(&self) -> Option<&'a str> {
        self.room_id
    }

    /// Queues an action for the active module.
    ///
    /// The action runs after the current transition finishes, in the order
    /// it was queued.
    pub fn dispatch(&self, action: impl Into<Action>, payload: Payload) {
        self.queue.push(action.into(), payload);
    }

    /// Publishes on the host's bus.
    ///
    /// Inside a transition or its hooks the event is held until the
    /// transition commits, and the returned report is empty. Events from
    /// `on_enter` are published after `PHASE/ENTER`. If the transition fails
    /// the event is never published. Use
    /// [`event_bus`](Self::event_bus) to publish immediately.
    pub fn publish(&self, event: &GameEvent) -> PublishReport {
        match self.outbox {
            Some(outbox) => {
                outbox.push(event.clone());
                PublishReport::default()
            }
            None => self.event_bus.publish(event),
        }
    }
}

impl std::fmt::Debug for ModuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module_id", self.module_id)
            .field("phase", self.phase)
            .field("player_id", &self.player_id)
            .field("room_id", &self.room_id)
            .finish_non_exhaustive()
    }
}
