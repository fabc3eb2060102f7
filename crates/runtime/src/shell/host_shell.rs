//! The state machine around the active module.

use std::future::Future;
use std::sync::Arc;

use party_core::{
    Action, ErrorSource, GameEvent, ModuleId, Payload, PhaseId, ScreenId, merge_patch,
};
use tracing::{debug, error, info, warn};

use super::error::ShellError;
use super::session::{ActiveSession, DispatchOutcome, SessionSnapshot, Transition};
use crate::api::ModuleRegistry;
use crate::events::EventBus;
use crate::host::HostConfig;
use crate::module::{DispatchQueue, ModuleContext, Outbox, ScreenView, StoreMap, Translator};
use crate::phases::{DispatchError, Dispatcher, HookError};
use crate::repository::{JsonStoreExt, KeyValueStore, NamespacedStore};
use crate::unwind;

/// Key of the persisted store inside a module's namespace.
const STATE_KEY: &str = "state";

/// Shared services handed to every module call.
struct ShellEnv {
    config: HostConfig,
    bus: EventBus,
    storage: Arc<dyn KeyValueStore>,
}

impl ShellEnv {
    fn context<'a>(
        &'a self,
        session: &'a ActiveSession,
        phase: &'a PhaseId,
        store: &'a StoreMap,
    ) -> ModuleContext<'a> {
        ModuleContext::new(
            &session.module_id,
            phase,
            &self.config.module,
            &self.bus,
            &session.queue,
            store,
        )
        .with_player(self.config.player_id.as_deref())
        .with_room(self.config.room_id.as_deref())
    }

    fn report(&self, module_id: &ModuleId, source: ErrorSource, message: impl Into<String>) {
        self.bus
            .publish(&GameEvent::error(Some(module_id.clone()), source, message));
    }

    fn hook_failed(
        &self,
        module_id: &ModuleId,
        phase: &PhaseId,
        stage: ErrorSource,
        source: HookError,
    ) -> ShellError {
        error!(
            target: "runtime::shell",
            module = %module_id,
            phase = %phase,
            stage = %stage,
            error = %source,
            "Hook failed"
        );
        self.report(
            module_id,
            stage,
            format!("{stage} hook failed in phase '{phase}': {source}"),
        );
        ShellError::Hook {
            module_id: module_id.clone(),
            phase: phase.clone(),
            stage,
            source,
        }
    }

    fn module_store(&self, module_id: &ModuleId) -> NamespacedStore {
        NamespacedStore::new(Arc::clone(&self.storage), module_id)
    }

    fn load_store(&self, module_id: &ModuleId) -> Result<Option<StoreMap>, ShellError> {
        if !self.config.persist_module_state {
            return Ok(None);
        }
        Ok(self.module_store(module_id).get_json(STATE_KEY)?)
    }

    fn persist(&self, session: &ActiveSession) {
        if !self.config.persist_module_state {
            return;
        }
        if let Err(e) = self
            .module_store(&session.module_id)
            .set_json(STATE_KEY, &session.store)
        {
            error!(
                target: "runtime::repository",
                module = %session.module_id,
                error = ?e,
                "Failed to persist module state"
            );
        }
    }
}

/// Runs a module hook, reporting a panic inside it as a hook failure.
async fn guarded<F>(hook: F) -> Result<(), HookError>
where
    F: Future<Output = Result<(), HookError>>,
{
    unwind::contain(hook, "hook panicked")
        .await
        .unwrap_or_else(|message| Err(HookError::new(format!("hook panicked: {message}"))))
}

/// Actions processed from the dispatch queue after an outer call.
#[derive(Default)]
struct Chain {
    transitions: Vec<Transition>,
    failures: usize,
    dropped: usize,
}

impl Chain {
    fn processed(&self) -> usize {
        self.transitions.len() + self.failures
    }
}

/// Hosts at most one active module and drives its phase state machine.
///
/// Every operation takes `&mut self`: a transition, including its exit and
/// enter hooks, always finishes before the next one starts.
pub struct HostShell {
    env: ShellEnv,
    registry: Arc<ModuleRegistry>,
    session: Option<ActiveSession>,
}

impl HostShell {
    pub fn new(
        config: HostConfig,
        registry: Arc<ModuleRegistry>,
        bus: EventBus,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            env: ShellEnv {
                config,
                bus,
                storage,
            },
            registry,
            session: None,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.env.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.env.bus
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_module(&self) -> Option<&ModuleId> {
        self.session.as_ref().map(|session| &session.module_id)
    }

    pub fn phase(&self) -> Option<&PhaseId> {
        self.session.as_ref().map(|session| &session.phase)
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(ActiveSession::snapshot)
    }

    /// Activates module `id`, entering `entry` or the module's entry phase.
    ///
    /// A module that is already active is deactivated first. On failure no
    /// module is left active.
    pub async fn activate(
        &mut self,
        id: &ModuleId,
        entry: Option<PhaseId>,
    ) -> Result<SessionSnapshot, ShellError> {
        let module = self
            .registry
            .get(id)
            .ok_or_else(|| ShellError::ModuleNotFound(id.clone()))?;

        if self.session.is_some()
            && let Err(e) = self.deactivate().await
        {
            warn!(target: "runtime::shell", error = %e, "Previous module did not exit cleanly");
        }

        let controllers = module.phase_controllers();
        let entry = entry.unwrap_or_else(|| module.entry_phase());
        let Some(entering) = controllers.get(&entry).cloned() else {
            let err = DispatchError::MissingController {
                module_id: id.clone(),
                phase: entry,
            };
            error!(target: "runtime::shell", error = %err, "Activation aborted");
            self.env.report(id, ErrorSource::Activation, err.to_string());
            return Err(err.into());
        };

        let store = match self.env.load_store(id) {
            Ok(Some(saved)) => {
                debug!(target: "runtime::shell", module = %id, "Restored persisted store");
                saved
            }
            Ok(None) => module.initial_store().unwrap_or_default(),
            Err(e) => {
                self.env.report(id, ErrorSource::Activation, e.to_string());
                return Err(e);
            }
        };

        let session = ActiveSession {
            module_id: id.clone(),
            controllers,
            screens: module.register_screens(),
            translations: module.translations(),
            phase: entry.clone(),
            store,
            queue: DispatchQueue::default(),
        };

        self.env.bus.publish(&GameEvent::LifecycleInit {
            module_id: id.clone(),
        });

        let outbox = Outbox::default();
        {
            let ctx = self
                .env
                .context(&session, &session.phase, &session.store)
                .deferred(&outbox);
            if let Err(source) = guarded(module.init(&ctx)).await {
                return Err(self.env.hook_failed(id, &entry, ErrorSource::Init, source));
            }
            if let Err(source) = guarded(entering.on_enter(&ctx)).await {
                return Err(self.env.hook_failed(id, &entry, ErrorSource::Enter, source));
            }
        }

        self.env.bus.publish(&GameEvent::PhaseEnter {
            module_id: id.clone(),
            phase: entry.clone(),
            from: None,
        });
        outbox.publish_to(&self.env.bus);
        self.env.bus.publish(&GameEvent::LifecycleReady {
            module_id: id.clone(),
            phase: entry.clone(),
        });
        info!(target: "runtime::shell", module = %id, phase = %entry, "Module activated");

        self.session = Some(session);
        self.drain_queue().await;

        self.snapshot().ok_or(ShellError::NoActiveModule)
    }

    /// Routes `action` to the current phase and applies the result.
    ///
    /// Actions queued by the module while handling it are processed
    /// afterwards, in order; their failures are reported on the bus and in
    /// the outcome but do not fail this call.
    pub async fn dispatch(
        &mut self,
        action: impl Into<Action>,
        payload: Payload,
    ) -> Result<DispatchOutcome, ShellError> {
        let transition = match self.step(action.into(), payload).await {
            Ok(transition) => transition,
            Err(e) => {
                self.discard_queue();
                return Err(e);
            }
        };

        let chain = self.drain_queue().await;
        let mut outcome = DispatchOutcome::new(transition);
        outcome.chained = chain.transitions;
        outcome.chained_failures = chain.failures;
        outcome.dropped = chain.dropped;
        Ok(outcome)
    }

    /// Exits the current phase and drops the session.
    ///
    /// The session is gone afterwards even if `on_exit` fails.
    pub async fn deactivate(&mut self) -> Result<SessionSnapshot, ShellError> {
        let session = self.session.take().ok_or(ShellError::NoActiveModule)?;

        let pending = session.queue.drain();
        if !pending.is_empty() {
            debug!(
                target: "runtime::shell",
                module = %session.module_id,
                count = pending.len(),
                "Discarding queued actions"
            );
        }

        let mut failure = None;
        if let Some(controller) = session.controllers.get(&session.phase).cloned() {
            let ctx = self.env.context(&session, &session.phase, &session.store);
            if let Err(source) = guarded(controller.on_exit(&ctx)).await {
                failure = Some(self.env.hook_failed(
                    &session.module_id,
                    &session.phase,
                    ErrorSource::Exit,
                    source,
                ));
            }
        }

        self.env.bus.publish(&GameEvent::PhaseExit {
            module_id: session.module_id.clone(),
            phase: session.phase.clone(),
            to: None,
        });
        info!(target: "runtime::shell", module = %session.module_id, "Module deactivated");

        match failure {
            Some(e) => Err(e),
            None => Ok(session.snapshot()),
        }
    }

    /// Renders the screen of the current phase.
    pub fn render(&self) -> Result<String, ShellError> {
        let session = self.session.as_ref().ok_or(ShellError::NoActiveModule)?;

        let screen_id = session
            .controllers
            .get(&session.phase)
            .and_then(|controller| controller.screen())
            .unwrap_or_else(|| ScreenId::from(&session.phase));
        let screen = session
            .screens
            .get(&screen_id)
            .ok_or_else(|| ShellError::MissingScreen {
                module_id: session.module_id.clone(),
                screen: screen_id.clone(),
            })?;

        let view = ScreenView {
            module_id: &session.module_id,
            phase: &session.phase,
            store: &session.store,
            translator: self.translator(session),
        };
        Ok(screen.render(&view))
    }

    /// Text for `key` in the configured locale, or the key itself.
    pub fn translate(&self, key: &str) -> Result<String, ShellError> {
        let session = self.session.as_ref().ok_or(ShellError::NoActiveModule)?;
        Ok(self.translator(session).text(key))
    }

    fn translator<'a>(&'a self, session: &'a ActiveSession) -> Translator<'a> {
        Translator::new(
            session.translations.as_ref(),
            &self.env.config.module.locale,
            &self.env.config.module.fallback_locale,
        )
    }

    /// Runs one action through the dispatcher and, for a change of phase,
    /// the exit and enter hooks. Nothing is committed unless both succeed.
    async fn step(&mut self, action: Action, payload: Payload) -> Result<Transition, ShellError> {
        let env = &self.env;
        let session = self.session.as_mut().ok_or(ShellError::NoActiveModule)?;
        let from = session.phase.clone();

        env.bus.publish(&GameEvent::ActionDispatch {
            module_id: session.module_id.clone(),
            phase: from.clone(),
            action: action.clone(),
            payload: payload.clone(),
        });

        let leaving = Outbox::default();
        let routed = {
            let ctx = env.context(session, &from, &session.store).deferred(&leaving);
            Dispatcher::new(&session.controllers).route(&action, payload.as_ref(), &ctx)
        };
        let result = match routed {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    target: "runtime::shell",
                    module = %session.module_id,
                    phase = %from,
                    error = %e,
                    "Dispatch rejected"
                );
                env.report(&session.module_id, ErrorSource::Transition, e.to_string());
                return Err(e.into());
            }
        };

        if result.is_self_loop(&from) {
            if let Some(effect) = &result.effect {
                merge_patch(&mut session.store, effect);
                env.persist(session);
            }
            leaving.publish_to(&env.bus);
            debug!(
                target: "runtime::shell",
                module = %session.module_id,
                phase = %from,
                action = %action,
                "Self-loop"
            );
            return Ok(Transition {
                action,
                to: from.clone(),
                from,
            });
        }

        let to = result.next;
        let dispatcher = Dispatcher::new(&session.controllers);
        let exiting = Arc::clone(dispatcher.controller(&session.module_id, &from)?);
        let entering = Arc::clone(dispatcher.controller(&session.module_id, &to)?);

        let mut staged = session.store.clone();
        if let Some(effect) = &result.effect {
            merge_patch(&mut staged, effect);
        }

        {
            let ctx = env.context(session, &from, &session.store).deferred(&leaving);
            if let Err(source) = guarded(exiting.on_exit(&ctx)).await {
                return Err(env.hook_failed(&session.module_id, &from, ErrorSource::Exit, source));
            }
        }
        let arriving = Outbox::default();
        {
            let ctx = env.context(session, &to, &staged).deferred(&arriving);
            if let Err(source) = guarded(entering.on_enter(&ctx)).await {
                return Err(env.hook_failed(&session.module_id, &to, ErrorSource::Enter, source));
            }
        }

        session.phase = to.clone();
        session.store = staged;
        env.persist(session);

        // Old-phase announcements precede PHASE/EXIT, on_enter ones follow PHASE/ENTER.
        leaving.publish_to(&env.bus);
        env.bus.publish(&GameEvent::PhaseExit {
            module_id: session.module_id.clone(),
            phase: from.clone(),
            to: Some(to.clone()),
        });
        env.bus.publish(&GameEvent::PhaseEnter {
            module_id: session.module_id.clone(),
            phase: to.clone(),
            from: Some(from.clone()),
        });
        arriving.publish_to(&env.bus);
        info!(
            target: "runtime::shell",
            module = %session.module_id,
            from = %from,
            to = %to,
            action = %action,
            "Phase committed"
        );

        Ok(Transition { action, from, to })
    }

    async fn drain_queue(&mut self) -> Chain {
        let mut chain = Chain::default();
        let limit = self.env.config.max_chained_dispatches;

        loop {
            let Some(session) = self.session.as_ref() else {
                break;
            };
            let Some(queued) = session.queue.pop() else {
                break;
            };

            if chain.processed() >= limit {
                let dropped = 1 + session.queue.drain().len();
                warn!(
                    target: "runtime::shell",
                    module = %session.module_id,
                    dropped,
                    limit,
                    "Chained dispatch limit reached"
                );
                self.env.report(
                    &session.module_id,
                    ErrorSource::Transition,
                    format!("dropped {dropped} queued action(s) after {limit} chained dispatches"),
                );
                chain.dropped = dropped;
                break;
            }

            debug!(target: "runtime::shell", action = %queued.action, "Processing queued action");
            match self.step(queued.action, queued.payload).await {
                Ok(transition) => chain.transitions.push(transition),
                Err(e) => {
                    warn!(target: "runtime::shell", error = %e, "Queued action failed");
                    chain.failures += 1;
                    self.discard_queue();
                }
            }
        }

        chain
    }

    fn discard_queue(&self) {
        if let Some(session) = &self.session {
            let pending = session.queue.drain();
            if !pending.is_empty() {
                debug!(
                    target: "runtime::shell",
                    module = %session.module_id,
                    count = pending.len(),
                    "Discarding actions queued by a failed dispatch"
                );
            }
        }
    }
}

impl std::fmt::Debug for HostShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostShell")
            .field("active_module", &self.active_module())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{GameModule, ScreenMap, Translations};
    use crate::phases::{PhaseControllerMap, transition_fn};
    use crate::repository::InMemoryStore;
    use async_trait::async_trait;
    use party_core::{EventKind, PhaseTransitionResult};
    use std::sync::Mutex;

    struct Quiz {
        id: ModuleId,
    }

    #[async_trait]
    impl GameModule for Quiz {
        fn id(&self) -> &ModuleId {
            &self.id
        }

        fn entry_phase(&self) -> PhaseId {
            PhaseId::from("intro")
        }

        async fn init(&self, _ctx: &ModuleContext<'_>) -> Result<(), HookError> {
            Ok(())
        }

        fn register_screens(&self) -> ScreenMap {
            let mut screens = ScreenMap::new();
            screens.insert(ScreenId::from("intro"), Arc::new(intro_screen));
            screens
        }

        fn phase_controllers(&self) -> PhaseControllerMap {
            PhaseControllerMap::new()
                .with(
                    "intro",
                    transition_fn(|action, _, ctx| {
                        Ok(if action.is("start") {
                            PhaseTransitionResult::to("question").with_value("asked", 1)
                        } else {
                            PhaseTransitionResult::stay(ctx.phase())
                        })
                    }),
                )
                .with(
                    "question",
                    transition_fn(|_, _, ctx| Ok(PhaseTransitionResult::stay(ctx.phase()))),
                )
        }

        fn translations(&self) -> Option<Translations> {
            Some(
                Translations::new()
                    .with("en", "title", "Quiz night")
                    .with("de", "title", "Quizabend"),
            )
        }
    }

    fn intro_screen(view: &ScreenView<'_>) -> String {
        view.t("title")
    }

    fn shell(config: HostConfig) -> HostShell {
        let registry = Arc::new(ModuleRegistry::new());
        registry
            .register_module(Quiz {
                id: ModuleId::from("quiz"),
            })
            .unwrap();
        HostShell::new(
            config,
            registry,
            EventBus::new(),
            Arc::new(InMemoryStore::new()),
        )
    }

    fn record(shell: &HostShell) -> Arc<Mutex<Vec<EventKind>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = shell.event_bus().subscribe_fn("recorder", move |event| {
            sink.lock().unwrap().push(event.kind());
        });
        seen
    }

    #[tokio::test]
    async fn operations_without_a_module_fail() {
        let mut shell = shell(HostConfig::default());

        assert!(matches!(
            shell.dispatch("start", None).await,
            Err(ShellError::NoActiveModule)
        ));
        assert!(matches!(shell.render(), Err(ShellError::NoActiveModule)));
        assert!(matches!(
            shell.deactivate().await,
            Err(ShellError::NoActiveModule)
        ));
        assert!(shell.snapshot().is_none());
    }

    #[tokio::test]
    async fn unknown_module_is_not_found() {
        let mut shell = shell(HostConfig::default());
        let err = shell
            .activate(&ModuleId::from("charades"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::ModuleNotFound(id) if id == "charades"));
    }

    #[tokio::test]
    async fn unknown_entry_phase_aborts_activation() {
        let mut shell = shell(HostConfig::default());
        let seen = record(&shell);

        let err = shell
            .activate(&ModuleId::from("quiz"), Some(PhaseId::from("bonus")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShellError::Dispatch(DispatchError::MissingController { .. })
        ));
        assert!(!shell.is_active());
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::Error]);
    }

    #[tokio::test]
    async fn render_uses_locale_and_reports_missing_screens() {
        let config = HostConfig {
            module: crate::module::ModuleConfig {
                locale: "de".to_owned(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut shell = shell(config);
        shell.activate(&ModuleId::from("quiz"), None).await.unwrap();

        assert_eq!(shell.render().unwrap(), "Quizabend");
        assert_eq!(shell.translate("missing.key").unwrap(), "missing.key");

        shell.dispatch("start", None).await.unwrap();
        assert!(matches!(
            shell.render(),
            Err(ShellError::MissingScreen { screen, .. }) if screen == "question"
        ));
    }

    #[tokio::test]
    async fn self_loop_publishes_no_phase_events() {
        let mut shell = shell(HostConfig::default());
        shell.activate(&ModuleId::from("quiz"), None).await.unwrap();
        let seen = record(&shell);

        let outcome = shell.dispatch("wave", None).await.unwrap();

        assert!(outcome.transition.is_self_loop());
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::ActionDispatch]);
    }

    #[tokio::test]
    async fn effect_is_merged_on_commit() {
        let mut shell = shell(HostConfig::default());
        shell.activate(&ModuleId::from("quiz"), None).await.unwrap();

        let outcome = shell.dispatch("start", None).await.unwrap();

        assert_eq!(outcome.phase(), "question");
        let snapshot = shell.snapshot().unwrap();
        assert_eq!(snapshot.store.get("asked"), Some(&serde_json::json!(1)));
    }
}
