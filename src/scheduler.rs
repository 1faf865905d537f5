/// Poll scheduler: one orchestrator, one in-flight guard, an injectable clock.
///
/// Timer ticks and manual refreshes both go through the same guard, so two
/// cycles never overlap and the dashboard never sees snapshots out of order.
/// The clock is a trait object so tests can step time by hand instead of
/// waiting on wall-clock timers.
///
/// Per-cycle states:
///
/// ```text
/// Idle ──tick/refresh──▶ Fetching ──▶ Succeeded
///                                 └─▶ Failed (fallback snapshot served)
/// ```

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::acquisition::{CycleOutcome, Orchestrator};
use crate::model::Snapshot;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let step = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }
}

impl Default for ManualClock {
    /// Starts at the Unix epoch.
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
    Succeeded,
    Failed,
}

/// What a tick or refresh did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollTrigger {
    /// A cycle ran; the snapshot it produced (live or fallback).
    Ran(Arc<Snapshot>),
    /// The poll interval has not elapsed since the last cycle started.
    NotDue,
    /// Another cycle is still running.
    AlreadyInFlight,
}

#[derive(Default)]
struct SchedulerState {
    state: Option<CycleState>,
    latest: Option<Arc<Snapshot>>,
    last_started: Option<DateTime<Utc>>,
    last_failure: Option<String>,
}

pub struct Scheduler {
    orchestrator: Orchestrator,
    clock: Arc<dyn Clock>,
    poll_interval: chrono::Duration,
    in_flight: AtomicBool,
    state: Mutex<SchedulerState>,
}

/// Clears the in-flight flag however the cycle ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub fn new(orchestrator: Orchestrator, clock: Arc<dyn Clock>, poll_interval: Duration) -> Self {
        Self {
            orchestrator,
            clock,
            poll_interval: chrono::Duration::from_std(poll_interval)
                .unwrap_or(chrono::Duration::seconds(60)),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SchedulerState::default()),
        }
    }

    /// Timer entry point: runs a cycle if none has run yet or the poll
    /// interval has elapsed since the last one started.
    pub fn tick(&self) -> PollTrigger {
        let now = self.clock.now();
        let due = match self.lock_state().last_started {
            None => true,
            Some(started) => now - started >= self.poll_interval,
        };
        if !due {
            return PollTrigger::NotDue;
        }
        self.run_cycle()
    }

    /// Manual refresh: runs a cycle now unless one is already in flight.
    pub fn refresh(&self) -> PollTrigger {
        self.run_cycle()
    }

    pub fn state(&self) -> CycleState {
        if self.in_flight.load(Ordering::Acquire) {
            return CycleState::Fetching;
        }
        self.lock_state().state.unwrap_or(CycleState::Idle)
    }

    /// Most recent snapshot, if any cycle has completed.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.lock_state().latest.clone()
    }

    /// Why the most recent cycle failed; `None` after a successful cycle.
    pub fn last_failure(&self) -> Option<String> {
        self.lock_state().last_failure.clone()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.to_std().unwrap_or(Duration::from_secs(60))
    }

    fn run_cycle(&self) -> PollTrigger {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("poll skipped, a cycle is already in flight");
            return PollTrigger::AlreadyInFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.lock_state().last_started = Some(self.clock.now());

        // No lock is held while the feeds are fetched.
        let outcome = self.orchestrator.acquire();
        let (state, failure) = match &outcome {
            CycleOutcome::Succeeded(_) => (CycleState::Succeeded, None),
            CycleOutcome::Failed(err) => (CycleState::Failed, Some(err.to_string())),
        };
        let snapshot = Arc::new(self.orchestrator.resolve(outcome));

        let mut shared = self.lock_state();
        shared.state = Some(state);
        shared.latest = Some(Arc::clone(&snapshot));
        shared.last_failure = failure;

        PollTrigger::Ran(snapshot)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
