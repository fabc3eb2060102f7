//! Synchronous publish/subscribe bus.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use party_core::{ErrorSource, GameEvent};
use tracing::{error, trace, warn};

use super::handler::{EventHandler, InfallibleHandler};
use crate::unwind;

/// Event bus configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Publish an `ERROR` event for every subscriber failure, after the
    /// failing event has been delivered to everyone else.
    pub report_failures: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            report_failures: true,
        }
    }
}

/// A subscriber that failed during a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    pub subscriber: String,
    pub message: String,
    pub panicked: bool,
}

/// Summary of one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that completed successfully.
    pub delivered: usize,
    /// Handlers removed by an earlier handler of the same publish.
    pub skipped: usize,
    pub failures: Vec<SubscriberFailure>,
    /// Handler invocations spent delivering the `ERROR` reports of
    /// `failures`. Not part of [`invoked`](Self::invoked).
    pub report_invocations: usize,
}

impl PublishReport {
    /// Number of handlers actually invoked, successful or not.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Entry {
    id: u64,
    handler: Arc<dyn EventHandler>,
    live: AtomicBool,
}

#[derive(Default)]
struct Subscribers {
    entries: Vec<Arc<Entry>>,
    next_id: u64,
}

type SharedSubscribers = Arc<RwLock<Subscribers>>;

/// Process-scoped event bus.
///
/// Every publish invokes each subscriber that was live when the publish
/// began, once, in subscription order. Handlers run without the bus lock
/// held, so they may subscribe, unsubscribe, clear, or publish themselves.
///
/// The same `Arc` handler subscribed twice shares a single subscription.
#[derive(Clone)]
pub struct EventBus {
    subscribers: SharedSubscribers,
    config: BusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Subscribers::default())),
            config,
        }
    }

    /// Registers `handler` and returns the capability to remove it.
    ///
    /// If this exact `Arc` is already subscribed, no new entry is created and
    /// the returned [`Subscription`] refers to the existing one.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) -> Subscription {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = subs
            .entries
            .iter()
            .find(|entry| same_handler(&entry.handler, &handler))
        {
            trace!(target: "runtime::bus", id = existing.id, "handler already subscribed");
            return Subscription {
                id: existing.id,
                subscribers: Arc::downgrade(&self.subscribers),
            };
        }

        let id = subs.next_id;
        subs.next_id += 1;
        subs.entries.push(Arc::new(Entry {
            id,
            handler,
            live: AtomicBool::new(true),
        }));

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Subscribes an infallible closure under a log-friendly name.
    pub fn subscribe_fn<F>(&self, name: &'static str, f: F) -> Subscription
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(InfallibleHandler { name, f }))
    }

    /// Delivers `event` to every current subscriber.
    ///
    /// Never fails: handler errors and panics are caught, logged, and listed
    /// in the returned report.
    ///
    /// With [`BusConfig::report_failures`] set, each failure is followed by
    /// one more delivery round for its `ERROR` event, so handlers may run
    /// more often than [`count`](Self::count) during a single call. Those
    /// extra runs are counted in [`PublishReport::report_invocations`];
    /// [`PublishReport::invoked`] covers `event` alone.
    pub fn publish(&self, event: &GameEvent) -> PublishReport {
        let mut report = self.deliver(event);

        if self.config.report_failures {
            let mut report_invocations = 0;
            for failure in &report.failures {
                let error_event = GameEvent::error(
                    event.module_id().cloned(),
                    ErrorSource::Subscriber,
                    format!(
                        "subscriber '{}' failed on {}: {}",
                        failure.subscriber,
                        event.kind(),
                        failure.message
                    ),
                );
                // Failures of the report itself are logged by deliver() only.
                let secondary = self.deliver(&error_event);
                report_invocations += secondary.invoked();
                if !secondary.is_clean() {
                    warn!(
                        target: "runtime::bus",
                        failures = secondary.failures.len(),
                        "subscribers failed while handling a failure report"
                    );
                }
            }
            report.report_invocations = report_invocations;
        }

        report
    }

    /// Removes every subscriber. Subscribers still pending in an ongoing
    /// publish are skipped.
    pub fn clear(&self) {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for entry in subs.entries.drain(..) {
            entry.live.store(false, Ordering::SeqCst);
        }
    }

    /// Number of live subscribers.
    pub fn count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    fn deliver(&self, event: &GameEvent) -> PublishReport {
        let snapshot: Vec<Arc<Entry>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone();

        let mut report = PublishReport::default();

        for entry in snapshot {
            if !entry.live.load(Ordering::SeqCst) {
                report.skipped += 1;
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.handler.handle(event)));
            let failure = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => SubscriberFailure {
                    subscriber: entry.handler.name().to_owned(),
                    message: err.to_string(),
                    panicked: false,
                },
                Err(payload) => SubscriberFailure {
                    subscriber: entry.handler.name().to_owned(),
                    message: unwind::message(payload.as_ref())
                        .unwrap_or_else(|| "subscriber panicked".to_owned()),
                    panicked: true,
                },
            };

            error!(
                target: "runtime::bus",
                subscriber = %failure.subscriber,
                event = %event.kind(),
                panicked = failure.panicked,
                error = %failure.message,
                "Subscriber failed, continuing delivery"
            );
            report.failures.push(failure);
        }

        report
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.count())
            .field("config", &self.config)
            .finish()
    }
}

/// Capability to remove one subscription.
///
/// Dropping it leaves the handler subscribed.
#[must_use = "dropping a Subscription does not unsubscribe; keep it to remove the handler later"]
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    subscribers: Weak<RwLock<Subscribers>>,
}

impl Subscription {
    /// Removes the handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return false;
        };
        let mut subs = subscribers.write().unwrap_or_else(PoisonError::into_inner);

        match subs.entries.iter().position(|entry| entry.id == self.id) {
            Some(index) => {
                let entry = subs.entries.remove(index);
                entry.live.store(false, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    // Compare the data pointers only; vtable pointers are not unique.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::HandlerError;
    use std::sync::Mutex;

    fn init() -> GameEvent {
        GameEvent::LifecycleInit {
            module_id: "blamegame".into(),
        }
    }

    fn ready() -> GameEvent {
        GameEvent::LifecycleReady {
            module_id: "blamegame".into(),
            phase: "intro".into(),
        }
    }

    type Log = Arc<Mutex<Vec<(&'static str, GameEvent)>>>;

    fn recorder(log: &Log, name: &'static str) -> Arc<dyn EventHandler> {
        let log = Arc::clone(log);
        Arc::new(move |event: &GameEvent| -> Result<(), HandlerError> {
            log.lock().unwrap().push((name, event.clone()));
            Ok(())
        })
    }

    fn quiet_bus() -> EventBus {
        EventBus::with_config(BusConfig {
            report_failures: false,
        })
    }

    #[test]
    fn publish_reaches_subscribers_in_order_then_respects_unsubscribe() {
        let bus = quiet_bus();
        let log: Log = Arc::default();

        let _h1 = bus.subscribe(recorder(&log, "h1"));
        let h2 = bus.subscribe(recorder(&log, "h2"));
        let _h3 = bus.subscribe(recorder(&log, "h3"));

        let report = bus.publish(&init());
        assert_eq!(report.delivered, 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec![("h1", init()), ("h2", init()), ("h3", init())]
        );

        assert!(h2.unsubscribe());
        log.lock().unwrap().clear();

        let report = bus.publish(&ready());
        assert_eq!(report.invoked(), 2);
        assert_eq!(*log.lock().unwrap(), vec![("h1", ready()), ("h3", ready())]);
    }

    #[test]
    fn same_handler_is_subscribed_once() {
        let bus = quiet_bus();
        let log: Log = Arc::default();
        let handler = recorder(&log, "dup");

        let first = bus.subscribe(Arc::clone(&handler));
        let _second = bus.subscribe(Arc::clone(&handler));
        assert_eq!(bus.count(), 1);

        bus.publish(&init());
        assert_eq!(log.lock().unwrap().len(), 1);

        assert!(first.unsubscribe());
        assert!(!first.unsubscribe());
        assert_eq!(bus.count(), 0);
    }

    #[test]
    fn failing_subscribers_do_not_block_others() {
        let bus = quiet_bus();
        let log: Log = Arc::default();

        let _before = bus.subscribe(recorder(&log, "before"));
        let _err = bus.subscribe(Arc::new(|_: &GameEvent| -> Result<(), HandlerError> {
            Err(HandlerError::new("nope"))
        }));
        let _panics = bus.subscribe_fn("panics", |_| panic!("kaboom"));
        let _after = bus.subscribe(recorder(&log, "after"));

        let report = bus.publish(&init());

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].message, "nope");
        assert!(!report.failures[0].panicked);
        assert_eq!(report.failures[1].subscriber, "panics");
        assert_eq!(report.failures[1].message, "kaboom");
        assert!(report.failures[1].panicked);

        let names: Vec<_> = log.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["before", "after"]);
    }

    #[test]
    fn failures_are_reported_once_on_the_bus() {
        let bus = EventBus::new();
        let errors = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&errors);
        let _observer = bus.subscribe_fn("observer", move |event| {
            if event.is_error() {
                sink.lock().unwrap().push(event.clone());
            }
        });
        // Fails on every event, including the failure report itself.
        let _faulty = bus.subscribe(Arc::new(|_: &GameEvent| -> Result<(), HandlerError> {
            Err(HandlerError::new("always"))
        }));

        let report = bus.publish(&init());

        assert_eq!(report.invoked(), bus.count());
        assert_eq!(report.report_invocations, 2);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            GameEvent::Error {
                module_id, source, ..
            } => {
                assert_eq!(module_id.as_ref().map(|m| m.as_str()), Some("blamegame"));
                assert_eq!(*source, ErrorSource::Subscriber);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn handler_unsubscribing_a_later_handler_skips_it() {
        let bus = quiet_bus();
        let log: Log = Arc::default();

        let victim: Arc<Mutex<Option<Subscription>>> = Arc::default();
        let slot = Arc::clone(&victim);
        let _a = bus.subscribe_fn("a", move |_| {
            if let Some(sub) = slot.lock().unwrap().as_ref() {
                sub.unsubscribe();
            }
        });
        let b = bus.subscribe(recorder(&log, "b"));
        *victim.lock().unwrap() = Some(b);

        let report = bus.publish(&init());

        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.count(), 1);
    }

    #[test]
    fn handlers_added_during_publish_wait_for_the_next_one() {
        let bus = quiet_bus();
        let log: Log = Arc::default();

        let inner_bus = bus.clone();
        let inner_log = Arc::clone(&log);
        let added = Arc::new(AtomicBool::new(false));
        let _adder = bus.subscribe_fn("adder", move |_| {
            if !added.swap(true, Ordering::SeqCst) {
                let _late = inner_bus.subscribe(recorder(&inner_log, "late"));
            }
        });

        let report = bus.publish(&init());
        assert_eq!(report.invoked(), 1);
        assert!(log.lock().unwrap().is_empty());

        let report = bus.publish(&ready());
        assert_eq!(report.invoked(), 2);
        assert_eq!(*log.lock().unwrap(), vec![("late", ready())]);
    }

    #[test]
    fn invocations_match_count_at_publish_start() {
        let bus = quiet_bus();
        let log: Log = Arc::default();
        let mut subs = Vec::new();

        for round in 0..5 {
            subs.push(bus.subscribe(recorder(&log, "r")));
            if round % 2 == 1 {
                subs.remove(0).unsubscribe();
            }
            let expected = bus.count();
            assert_eq!(bus.publish(&init()).invoked(), expected);
        }
    }

    #[test]
    fn clear_stops_all_delivery() {
        let bus = quiet_bus();
        let log: Log = Arc::default();
        let sub = bus.subscribe(recorder(&log, "h"));
        let _other = bus.subscribe(recorder(&log, "g"));

        bus.clear();

        assert_eq!(bus.count(), 0);
        assert_eq!(bus.publish(&init()).invoked(), 0);
        assert!(log.lock().unwrap().is_empty());
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn clear_during_publish_skips_the_rest() {
        let bus = quiet_bus();
        let log: Log = Arc::default();

        let inner = bus.clone();
        let _clearer = bus.subscribe_fn("clearer", move |_| inner.clear());
        let _next = bus.subscribe(recorder(&log, "next"));

        let report = bus.publish(&init());

        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert!(log.lock().unwrap().is_empty());
    }
}
