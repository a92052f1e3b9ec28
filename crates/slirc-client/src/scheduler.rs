//! One-shot, cancelable deferred actions keyed by slot.
//!
//! At most one action may be pending per slot. Scheduling into an occupied
//! slot is refused with [`SchedulerBusy`] and leaves the pending action as it
//! was. A firing action frees its slot just before it runs, so it may
//! schedule into the same slot again.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{Instrument, debug};

use crate::error::SchedulerBusy;
use crate::telemetry::spans;

/// Identifies one scheduled action, for [`Scheduler::cancel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeferredHandle {
    slot: String,
    id: u64,
}

impl DeferredHandle {
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

struct Pending {
    id: u64,
    abort: AbortHandle,
}

/// Deferred action scheduler.
///
/// Cheap to clone; clones share slots. Timers run on the Tokio runtime, so
/// [`schedule`](Self::schedule) must be called from within one.
#[derive(Clone, Default)]
pub struct Scheduler {
    slots: Arc<Mutex<HashMap<String, Pending>>>,
    next_id: Arc<AtomicU64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once after `delay`, unless `slot` is already taken.
    pub fn schedule<F>(
        &self,
        slot: &str,
        delay: Duration,
        action: F,
    ) -> Result<DeferredHandle, SchedulerBusy>
    where
        F: FnOnce() + Send + 'static,
    {
        // Held across the spawn so the timer cannot observe the slot before
        // it is recorded.
        let mut slots = self.slots.lock();
        if slots.contains_key(slot) {
            return Err(SchedulerBusy {
                slot: slot.to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + delay;
        let shared = Arc::clone(&self.slots);
        let key = slot.to_string();

        let task = tokio::spawn(
            async move {
                tokio::time::sleep_until(deadline).await;

                let ours = {
                    let mut slots = shared.lock();
                    match slots.get(&key) {
                        Some(pending) if pending.id == id => {
                            slots.remove(&key);
                            true
                        }
                        _ => false,
                    }
                };

                if ours {
                    debug!("firing");
                    action();
                }
            }
            .instrument(spans::deferred(slot)),
        );

        slots.insert(
            slot.to_string(),
            Pending {
                id,
                abort: task.abort_handle(),
            },
        );
        debug!(slot, delay_ms = delay.as_millis() as u64, "Deferred action scheduled");

        Ok(DeferredHandle {
            slot: slot.to_string(),
            id,
        })
    }

    /// Stop `handle`'s action if it has not fired yet.
    ///
    /// Returns whether anything was canceled; canceling a fired or already
    /// canceled action is a no-op.
    pub fn cancel(&self, handle: &DeferredHandle) -> bool {
        let mut slots = self.slots.lock();
        match slots.get(&handle.slot) {
            Some(pending) if pending.id == handle.id => {
                if let Some(pending) = slots.remove(&handle.slot) {
                    pending.abort.abort();
                }
                debug!(slot = %handle.slot, "Deferred action canceled");
                true
            }
            _ => false,
        }
    }

    /// Cancel whatever is pending in `slot`.
    pub fn cancel_slot(&self, slot: &str) -> bool {
        match self.slots.lock().remove(slot) {
            Some(pending) => {
                pending.abort.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel everything.
    pub fn cancel_all(&self) {
        for (_, pending) in self.slots.lock().drain() {
            pending.abort.abort();
        }
    }

    pub fn is_pending(&self, slot: &str) -> bool {
        self.slots.lock().contains_key(slot)
    }
}
