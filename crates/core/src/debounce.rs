//! Debounced input scheduling.
//!
//! Collapses a burst of input changes into one settled term, published after
//! the input has stayed unchanged for the quiet interval. Intermediate values
//! are discarded, never queued.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::metrics::DEBOUNCE_PUBLISHES;

/// Default quiet interval before a term settles.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Default)]
struct PendingSlot {
    /// Bumped on every observe/cancel; a timer only publishes if its
    /// generation is still current when it wakes.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Single-slot debounce timer.
///
/// Each [`observe`](Self::observe) replaces the pending timer. Settled terms
/// are delivered on the receiver returned by [`new`](Self::new).
///
/// Must be used from within a tokio runtime.
pub struct Debouncer {
    quiet: Duration,
    slot: Arc<Mutex<PendingSlot>>,
    tx: mpsc::UnboundedSender<String>,
}

impl Debouncer {
    /// Create a debouncer and the receiver its settled terms are published on.
    pub fn new(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            quiet,
            slot: Arc::new(Mutex::new(PendingSlot::default())),
            tx,
        };
        (debouncer, rx)
    }

    /// Record an input change, restarting the quiet interval.
    pub fn observe(&self, term: impl Into<String>) {
        let term = term.into();
        let mut slot = lock(&self.slot);

        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let tx = self.tx.clone();
        let quiet = self.quiet;

        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;

            let mut slot = lock(&shared);
            if slot.generation != generation {
                return;
            }
            slot.timer = None;

            debug!("Search term settled: '{}'", term);
            DEBOUNCE_PUBLISHES.inc();
            // Receiver gone means the pipeline shut down.
            let _ = tx.send(term);
        }));
    }

    /// Drop the pending timer without publishing.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
    }

    /// Whether a timer is armed.
    pub fn has_pending(&self) -> bool {
        lock(&self.slot).timer.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(slot: &Mutex<PendingSlot>) -> MutexGuard<'_, PendingSlot> {
    // The slot holds no invariant a panicking holder could break halfway.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
