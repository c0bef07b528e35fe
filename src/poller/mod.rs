//! Background data acquisition.
//!
//! Each [`Poller`] runs on its own named OS thread, posts every cycle's
//! outcome to the dispatch queue and then sleeps on its [`StopSignal`]. A
//! poller never touches a window or the registry.

pub mod http;
pub mod metrics;
pub mod serial;
pub mod signal;

pub use signal::{StopSignal, Wake};

use crate::dispatch::Dispatcher;
use crate::error::PollError;
use crate::payload::{Payload, SourceKind};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// When the next cycle should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    After(Duration),
    /// Sleep until stopped or nudged.
    Idle,
}

/// Outcomes of one cycle, in the order they should be rendered.
#[derive(Debug)]
pub struct Cycle {
    pub outcomes: Vec<Result<Payload, PollError>>,
    pub next: Cadence,
}

impl Cycle {
    pub fn new(outcomes: Vec<Result<Payload, PollError>>, next: Cadence) -> Self {
        Self { outcomes, next }
    }

    pub fn single(outcome: Result<Payload, PollError>, next: Duration) -> Self {
        Self::new(vec![outcome], Cadence::After(next))
    }

    pub fn silent(next: Duration) -> Self {
        Self::new(Vec::new(), Cadence::After(next))
    }
}

/// Shortest cadence accepted from settings.
pub const MIN_INTERVAL: Duration = Duration::from_millis(50);
/// Longest cadence or delay accepted from settings.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Seconds from settings as a `Duration`; negative values become zero.
pub(crate) fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}

pub trait Poller: Send + 'static {
    fn kind(&self) -> SourceKind;

    /// Run one acquisition cycle. Blocking I/O is allowed here; long
    /// internal waits should go through `signal` so a stop cuts them short.
    fn cycle(&mut self, signal: &StopSignal) -> Cycle;
}

/// Stand-in used when a source's capability is not compiled in. Posts a
/// single `Unavailable` payload and then idles.
pub struct UnavailablePoller {
    kind: SourceKind,
    reported: bool,
}

impl UnavailablePoller {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            reported: false,
        }
    }
}

impl Poller for UnavailablePoller {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn cycle(&mut self, _signal: &StopSignal) -> Cycle {
        if std::mem::replace(&mut self.reported, true) {
            return Cycle::new(Vec::new(), Cadence::Idle);
        }
        tracing::info!(kind = %self.kind, "source unavailable in this build");
        Cycle::new(vec![Ok(Payload::Unavailable(self.kind))], Cadence::Idle)
    }
}

/// Owner-side handle to one running poller.
pub struct PollerHandle {
    name: String,
    signal: StopSignal,
    join: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signal(&self) -> &StopSignal {
        &self.signal
    }

    pub fn stop(&self) {
        self.signal.stop();
    }

    pub fn nudge(&self) {
        self.signal.nudge();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop and wait up to `timeout` for the thread to exit. A thread still
    /// blocked in I/O after that is left to finish on its own.
    pub fn stop_and_join(mut self, timeout: Duration) -> bool {
        self.stop();
        let deadline = Instant::now() + timeout;
        while !self.is_finished() {
            if Instant::now() >= deadline {
                tracing::debug!(poller = %self.name, "poller still busy; detaching");
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                tracing::error!(poller = %self.name, "poller thread panicked");
            }
        }
        true
    }
}

/// Start `poller` on a dedicated thread posting to `target`.
pub fn spawn<P: Poller>(
    target: &str,
    poller: P,
    dispatcher: Dispatcher,
) -> std::io::Result<PollerHandle> {
    let signal = StopSignal::new();
    let thread_signal = signal.clone();
    let thread_target = target.to_string();
    let join = thread::Builder::new()
        .name(format!("poller-{target}"))
        .spawn(move || run(&thread_target, poller, &dispatcher, &thread_signal))?;
    Ok(PollerHandle {
        name: target.to_string(),
        signal,
        join: Some(join),
    })
}

/// Poller loop body. Public so tests can drive a poller on their own thread.
pub fn run<P: Poller>(target: &str, mut poller: P, dispatcher: &Dispatcher, signal: &StopSignal) {
    tracing::info!(window = %target, kind = %poller.kind(), "poller started");
    while !signal.is_stopped() {
        let cycle = match catch_unwind(AssertUnwindSafe(|| poller.cycle(signal))) {
            Ok(cycle) => cycle,
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                Cycle::single(Err(PollError::Panicked(msg)), Duration::from_secs(1))
            }
        };
        if signal.is_stopped() {
            break;
        }
        for outcome in cycle.outcomes {
            dispatcher.post(target, outcome);
        }
        let wake = match cycle.next {
            Cadence::After(delay) => signal.wait(delay),
            Cadence::Idle => signal.wait_idle(),
        };
        if wake == Wake::Stopped {
            break;
        }
    }
    tracing::info!(window = %target, "poller stopped");
}

/// All running pollers, keyed by window name.
#[derive(Default)]
pub struct Supervisor {
    handles: HashMap<String, PollerHandle>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<P: Poller>(
        &mut self,
        target: &str,
        poller: P,
        dispatcher: Dispatcher,
    ) -> std::io::Result<&PollerHandle> {
        if let Some(old) = self.handles.remove(target) {
            old.stop();
        }
        let handle = spawn(target, poller, dispatcher)?;
        Ok(self.handles.entry(target.to_string()).or_insert(handle))
    }

    pub fn get(&self, target: &str) -> Option<&PollerHandle> {
        self.handles.get(target)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn nudge(&self, target: &str) -> bool {
        match self.handles.get(target) {
            Some(handle) => {
                handle.nudge();
                true
            }
            None => false,
        }
    }

    /// Stop the poller feeding `target`, if any.
    pub fn stop(&mut self, target: &str) -> bool {
        match self.handles.remove(target) {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }

    /// Stop every poller and wait briefly for them to exit.
    pub fn shutdown(&mut self, timeout: Duration) {
        for handle in self.handles.values() {
            handle.stop();
        }
        let deadline = Instant::now() + timeout;
        for (_, handle) in self.handles.drain() {
            let left = deadline.saturating_duration_since(Instant::now());
            handle.stop_and_join(left);
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.stop();
        }
    }
}
