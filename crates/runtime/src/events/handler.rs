//! Subscriber contract for the event bus.

use party_core::GameEvent;
use thiserror::Error;

/// Failure reported by a subscriber while handling an event.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A bus subscriber.
///
/// Subscribers run synchronously inside [`EventBus::publish`]. Returning an
/// error (or panicking) is reported and isolated; it never stops delivery to
/// the remaining subscribers.
///
/// Any `Fn(&GameEvent) -> Result<(), HandlerError>` closure is a handler.
///
/// [`EventBus::publish`]: super::EventBus::publish
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &GameEvent) -> Result<(), HandlerError>;

    /// Label used when logging this subscriber's failures.
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> EventHandler for F
where
    F: Fn(&GameEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &GameEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Adapter that turns an infallible closure into a named handler.
pub(crate) struct InfallibleHandler<F> {
    pub(crate) name: &'static str,
    pub(crate) f: F,
}

impl<F> EventHandler for InfallibleHandler<F>
where
    F: Fn(&GameEvent) + Send + Sync,
{
    fn handle(&self, event: &GameEvent) -> Result<(), HandlerError> {
        (self.f)(event);
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}
