//! Panic containment shared by the bus, the dispatcher, and the shell.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Text of a panic payload, when it carries one.
pub(crate) fn message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

/// Awaits `fut`, turning a panic while polling it into `Err(message)`.
pub(crate) async fn contain<F>(fut: F, fallback: &str) -> Result<F::Output, String>
where
    F: Future,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(|payload| message(payload.as_ref()).unwrap_or_else(|| fallback.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn explode() -> u8 {
        panic!("lights out")
    }

    async fn opaque() -> u8 {
        std::panic::panic_any(42_u8)
    }

    #[tokio::test]
    async fn panics_become_errors() {
        assert_eq!(
            contain(explode(), "hook panicked").await,
            Err("lights out".to_owned())
        );
        assert_eq!(contain(async { 7_u8 }, "hook panicked").await, Ok(7));
    }

    #[tokio::test]
    async fn opaque_payloads_use_the_fallback() {
        assert_eq!(
            contain(opaque(), "hook panicked").await,
            Err("hook panicked".to_owned())
        );
    }
}
