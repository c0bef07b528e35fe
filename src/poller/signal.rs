use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Why a [`StopSignal::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Nudged,
    Stopped,
}

#[derive(Debug, Default)]
struct State {
    stopped: bool,
    nudged: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    cv: Condvar,
}

/// Cooperative stop flag shared between a poller thread and its owner.
///
/// Pollers sleep through [`StopSignal::wait`], so a stop or a nudge ends the
/// sleep immediately instead of after the full interval.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stop(&self) {
        self.state().stopped = true;
        self.inner.cv.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    /// Cut the current (or next) wait short without stopping.
    pub fn nudge(&self) {
        self.state().nudged = true;
        self.inner.cv.notify_all();
    }

    /// Sleep for `timeout` unless stopped or nudged first. A timeout past
    /// the clock's range sleeps like [`StopSignal::wait_idle`].
    pub fn wait(&self, timeout: Duration) -> Wake {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait_idle();
        };
        let mut state = self.state();
        loop {
            if state.stopped {
                return Wake::Stopped;
            }
            if state.nudged {
                state.nudged = false;
                return Wake::Nudged;
            }
            let now = Instant::now();
            if now >= deadline {
                return Wake::Elapsed;
            }
            state = match self.inner.cv.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Sleep until stopped or nudged.
    pub fn wait_idle(&self) -> Wake {
        let mut state = self.state();
        loop {
            if state.stopped {
                return Wake::Stopped;
            }
            if state.nudged {
                state.nudged = false;
                return Wake::Nudged;
            }
            state = match self.inner.cv.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}
