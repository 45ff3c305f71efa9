//! Polling, settle delays, and cancellation.
//!
//! The host portal is an event-loop-driven UI: every wait here is an
//! explicit yield back to the runtime, never a busy loop. All bounded
//! polling goes through [`await_condition`] so the timeout policy lives
//! in one place.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sleep for the given number of milliseconds. Zero returns immediately
/// without touching the timer, which keeps test configs instant.
pub async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Poll `probe` at a fixed interval until it reports true or the
/// attempt budget runs out. Returns whether the predicate fired;
/// exhausting the budget is not an error, callers decide what a miss
/// means.
pub async fn await_condition<F, Fut>(interval_ms: u64, max_attempts: u32, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 0..max_attempts {
        if probe().await {
            return true;
        }
        if attempt + 1 < max_attempts {
            sleep_ms(interval_ms).await;
        }
    }
    false
}

/// Cloneable cancellation flag for one automation run.
///
/// Advisory: the orchestrator checks it at the top of each employee and
/// each shift iteration and inside the login wait, then winds down
/// cleanly with the partial outcome.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation at the next safe point.
    pub fn request_cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
