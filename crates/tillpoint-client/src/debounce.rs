//! # Debouncer
//!
//! Holds a call back for a quiet period and drops it if a newer call arrives
//! in the meantime. Used for product search while the cashier is typing.
//!
//! ```text
//!   t=0    run("fa")   ─── sleep 350ms ───► superseded ──► None
//!   t=120  run("fan")  ─── sleep 350ms ───► still latest ──► Some(search("fan"))
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            generation: AtomicU64::new(0),
        }
    }

    /// Waits out the window, then runs `call` unless a newer `run` or a
    /// [`cancel`](Self::cancel) happened meanwhile.
    pub async fn run<F, Fut, T>(&self, call: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.window).await;
        if self.generation.load(Ordering::SeqCst) != mine {
            trace!(generation = mine, "Debounced call superseded");
            return None;
        }
        Some(call().await)
    }

    /// Drops whatever call is currently waiting.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
