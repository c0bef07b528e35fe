//! Hand-off from poller threads to the UI thread.
//!
//! Any number of [`Dispatcher`] clones post from any thread; the UI loop
//! drains the [`DispatchQueue`] once per tick. This drain is the one place
//! where poll failures are logged and discarded.

use crate::error::{PollError, RenderError};
use crate::payload::Payload;
use crate::registry::Registry;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Callback used to wake the UI loop after a post.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Result of one poll cycle addressed to one window.
#[derive(Debug, Clone)]
pub struct DispatchedUpdate {
    pub target: String,
    pub outcome: Result<Payload, PollError>,
    pub enqueued_at: Instant,
}

struct Shared {
    pending: Mutex<VecDeque<DispatchedUpdate>>,
    cap_per_window: usize,
    dropped: AtomicU64,
    waker: Mutex<Option<Waker>>,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, VecDeque<DispatchedUpdate>> {
        // A producer that panicked mid-post cannot leave the deque in a
        // broken state, so a poisoned lock is still usable.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Consumer side, owned by the UI loop.
pub struct DispatchQueue {
    shared: Arc<Shared>,
}

/// Producer side. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

/// Counters from one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub applied: usize,
    pub poll_errors: usize,
    pub render_errors: usize,
    pub orphaned: usize,
}

impl DispatchQueue {
    /// `cap_per_window` bounds the backlog for each target; when exceeded
    /// the oldest pending update for that target is dropped.
    pub fn new(cap_per_window: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                pending: Mutex::new(VecDeque::new()),
                cap_per_window: cap_per_window.max(1),
                dropped: AtomicU64::new(0),
                waker: Mutex::new(None),
            }),
        }
    }

    pub fn set_waker(&self, waker: Waker) {
        let mut slot = self.shared.waker.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(waker);
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn len(&self) -> usize {
        self.shared.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.pending().is_empty()
    }

    /// Updates dropped so far because a target's backlog overflowed.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Take every pending update in post order.
    pub fn drain(&self) -> Vec<DispatchedUpdate> {
        let mut pending = self.shared.pending();
        pending.drain(..).collect()
    }

    /// Drain and render every pending update into its window.
    ///
    /// Poll errors are logged and discarded; render errors leave the window
    /// on its last good state; updates for closed windows are dropped.
    pub fn drain_into(&self, registry: &mut Registry) -> DrainStats {
        let mut stats = DrainStats::default();
        for update in self.drain() {
            let DispatchedUpdate {
                target,
                outcome,
                enqueued_at,
            } = update;
            let payload = match outcome {
                Ok(payload) => payload,
                Err(err) => {
                    stats.poll_errors += 1;
                    if err.is_transient() {
                        tracing::debug!(window = %target, error = %err, "poll cycle failed");
                    } else {
                        tracing::warn!(window = %target, error = %err, "poll cycle failed");
                    }
                    continue;
                }
            };
            let Some(window) = registry.get_mut(&target) else {
                stats.orphaned += 1;
                tracing::trace!(window = %target, "update for closed window dropped");
                continue;
            };
            match window.render_update(payload) {
                Ok(()) => {
                    stats.applied += 1;
                    tracing::trace!(
                        window = %target,
                        latency_ms = enqueued_at.elapsed().as_millis() as u64,
                        "update rendered"
                    );
                }
                Err(err) => {
                    stats.render_errors += 1;
                    log_render_error(&target, &err);
                }
            }
        }
        stats
    }
}

fn log_render_error(target: &str, err: &RenderError) {
    tracing::warn!(window = %target, error = %err, "render update rejected");
}

impl Dispatcher {
    /// Queue an update for `target`. Never blocks on the UI thread.
    pub fn post(&self, target: &str, outcome: Result<Payload, PollError>) {
        let update = DispatchedUpdate {
            target: target.to_string(),
            outcome,
            enqueued_at: Instant::now(),
        };
        let overflowed = {
            let mut pending = self.shared.pending();
            pending.push_back(update);
            let backlog = pending.iter().filter(|u| u.target == target).count();
            if backlog > self.shared.cap_per_window {
                if let Some(idx) = pending.iter().position(|u| u.target == target) {
                    pending.remove(idx);
                }
                true
            } else {
                false
            }
        };
        if overflowed {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(window = %target, "dispatch backlog full; dropped oldest update");
        }
        let waker = self
            .shared
            .waker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(wake) = waker {
            wake();
        }
    }
}
