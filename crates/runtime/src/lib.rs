//! Coordination core for League of Fun game modules.
//!
//! This crate wires together the event bus, the module registry, phase
//! controllers, persistence, and the host worker into a cohesive API.
//! Consumers register [`GameModule`]s, build a [`Host`], and drive it
//! through [`HostHandle`].
//!
//! Modules are organized by responsibility:
//! - [`host`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the synchronous publish/subscribe bus
//! - [`module`] and [`phases`] define the contract game modules implement
//! - [`shell`] applies actions and phase changes to the active module
//! - [`repository`] provides key-value persistence
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod host;
pub mod module;
pub mod phases;
pub mod repository;
pub mod shell;

mod unwind;
mod workers;

pub use api::{HostHandle, ModuleRegistry, RegistryError, Result, RuntimeError};
pub use events::{
    BusConfig, EventBus, EventHandler, HandlerError, PublishReport, SubscriberFailure,
    Subscription,
};
pub use host::{Host, HostBuilder, HostConfig};
pub use module::{
    DispatchQueue, GameModule, ModuleCapabilities, ModuleConfig, ModuleContext, Screen, ScreenMap,
    ScreenView, StoreMap, ThemeExtensions, Translations, Translator,
};
pub use phases::{
    DispatchError, Dispatcher, HookError, PhaseController, PhaseControllerMap, TransitionFn,
    transition_fn,
};
pub use repository::{
    FileStore, InMemoryStore, JsonStoreExt, KeyValueStore, NamespacedStore, RepositoryError,
};
pub use shell::{DispatchOutcome, HostShell, SessionSnapshot, ShellError, Transition};
