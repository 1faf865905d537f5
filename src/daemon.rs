/// Core daemon implementation for the reservoir telemetry service
///
/// Owns the scheduler and drives it from a plain timer loop:
/// 1. Builds the orchestrator over the configured feeds
/// 2. Ticks the scheduler, which runs a cycle whenever the poll interval
///    has elapsed
/// 3. Keeps going regardless of cycle outcome; a failed cycle serves the
///    fallback snapshot and the next tick tries again

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::acquisition::Orchestrator;
use crate::config::MonitorConfig;
use crate::model::AcquisitionError;
use crate::scheduler::{Clock, PollTrigger, Scheduler, SystemClock};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Daemon loop configuration
pub struct DaemonConfig {
    /// How often the loop wakes to check whether a cycle is due. Much
    /// shorter than the poll interval so manual refreshes and the timer
    /// share one cadence without drifting.
    pub tick_granularity: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            tick_granularity: Duration::from_secs(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Daemon State
// ---------------------------------------------------------------------------

pub struct Daemon {
    config: DaemonConfig,
    scheduler: Arc<Scheduler>,
}

impl Daemon {
    /// Create a daemon polling the configured feeds on the wall clock
    pub fn new(monitor: MonitorConfig) -> Result<Self, AcquisitionError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let interval = monitor.poll_interval();
        let orchestrator = Orchestrator::from_config(monitor, Arc::clone(&clock))?;
        let scheduler = Scheduler::new(orchestrator, clock, interval);
        Ok(Self::with_scheduler(DaemonConfig::default(), Arc::new(scheduler)))
    }

    /// Create daemon around an existing scheduler
    pub fn with_scheduler(config: DaemonConfig, scheduler: Arc<Scheduler>) -> Self {
        Self { config, scheduler }
    }

    /// Shared handle for the HTTP endpoint.
    pub fn scheduler(&self) -> Arc<Scheduler> {
        Arc::clone(&self.scheduler)
    }

    /// One loop iteration. Returns true if a cycle ran.
    pub fn step(&self) -> bool {
        match self.scheduler.tick() {
            PollTrigger::Ran(snapshot) => {
                info!(
                    fallback = snapshot.sourced_from_fallback,
                    fetched_at = %snapshot.fetched_at,
                    "snapshot updated"
                );
                true
            }
            PollTrigger::NotDue | PollTrigger::AlreadyInFlight => false,
        }
    }

    /// Main daemon loop (runs indefinitely)
    pub fn run(&self) -> ! {
        info!(
            poll_interval_secs = self.scheduler.poll_interval().as_secs(),
            "starting poll loop"
        );

        loop {
            self.step();
            std::thread::sleep(self.config.tick_granularity);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
