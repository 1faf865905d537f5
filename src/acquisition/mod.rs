/// Acquisition orchestrator.
///
/// Runs one poll cycle: refuse mixed-security requests, fetch the three
/// feeds concurrently, decode, normalize, and assemble a `Snapshot`.
///
/// A cycle is all-or-nothing. Any single fetch failure, missing response at
/// the cycle deadline, or undecodable payload fails the whole cycle; there is
/// never a snapshot built from some live feeds and some fallback data.
///
/// The raw outcome is a tagged `CycleOutcome`. Substituting the fallback
/// snapshot is a separate step (`resolve`), so callers that care (the
/// scheduler, tests) can still tell live data from fallback data.

pub mod fallback;

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use threadpool::ThreadPool;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::ingest::client::{HttpSourceClient, SourceClient};
use crate::ingest::normalize::{normalize_alarms, normalize_rainfall, normalize_reservoir};
use crate::ingest::wire::Document;
use crate::logging::log_cycle_failure;
use crate::model::{AcquisitionError, Feed, Snapshot};
use crate::scheduler::Clock;

pub use fallback::fallback_snapshot;

// ---------------------------------------------------------------------------
// Cycle outcome
// ---------------------------------------------------------------------------

/// Result of one acquisition cycle before the fallback policy is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Succeeded(Snapshot),
    Failed(AcquisitionError),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Succeeded(_))
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

/// One source client per feed.
#[derive(Clone)]
pub struct FeedClients {
    pub reservoir: Arc<dyn SourceClient>,
    pub alarms: Arc<dyn SourceClient>,
    pub rainfall: Arc<dyn SourceClient>,
}

impl FeedClients {
    /// HTTP clients for the configured feed addresses.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, AcquisitionError> {
        Ok(Self {
            reservoir: Arc::new(HttpSourceClient::for_feed(config, Feed::Reservoir)?),
            alarms: Arc::new(HttpSourceClient::for_feed(config, Feed::Alarms)?),
            rainfall: Arc::new(HttpSourceClient::for_feed(config, Feed::Rainfall)?),
        })
    }

    pub fn get(&self, feed: Feed) -> &Arc<dyn SourceClient> {
        match feed {
            Feed::Reservoir => &self.reservoir,
            Feed::Alarms => &self.alarms,
            Feed::Rainfall => &self.rainfall,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

type FetchResult = (Feed, Result<String, AcquisitionError>, Duration);

pub struct Orchestrator {
    config: MonitorConfig,
    clients: FeedClients,
    clock: Arc<dyn Clock>,
    pool: Mutex<ThreadPool>,
}

impl Orchestrator {
    pub fn new(config: MonitorConfig, clients: FeedClients, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clients,
            clock,
            pool: Mutex::new(ThreadPool::with_name("feed-fetch".to_string(), Feed::ALL.len())),
        }
    }

    /// Orchestrator over the configured HTTP feeds.
    pub fn from_config(config: MonitorConfig, clock: Arc<dyn Clock>) -> Result<Self, AcquisitionError> {
        let clients = FeedClients::from_config(&config)?;
        Ok(Self::new(config, clients, clock))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Always returns a snapshot: live data when the cycle succeeds, the
    /// fallback snapshot otherwise.
    pub fn poll(&self) -> Snapshot {
        let outcome = self.acquire();
        self.resolve(outcome)
    }

    /// Fallback policy: a failed cycle becomes the fallback snapshot.
    pub fn resolve(&self, outcome: CycleOutcome) -> Snapshot {
        match outcome {
            CycleOutcome::Succeeded(snapshot) => snapshot,
            CycleOutcome::Failed(err) => {
                log_cycle_failure(&err);
                fallback_snapshot(self.clock.now())
            }
        }
    }

    /// Runs one cycle and reports its raw outcome.
    pub fn acquire(&self) -> CycleOutcome {
        let started = Instant::now();

        if let Err(err) = self.check_transport_security() {
            return CycleOutcome::Failed(err);
        }

        let bodies = match self.fetch_all() {
            Ok(bodies) => bodies,
            Err(err) => return CycleOutcome::Failed(err),
        };
        let [reservoir, alarms, rainfall] = match decode_all(bodies) {
            Ok(documents) => documents,
            Err(err) => return CycleOutcome::Failed(err),
        };

        let snapshot = Snapshot {
            reservoir: normalize_reservoir(reservoir.root()),
            rainfall: normalize_rainfall(rainfall.root()),
            alarms: normalize_alarms(alarms.root()),
            sourced_from_fallback: false,
            fetched_at: self.clock.now(),
        };

        info!(
            stations = snapshot.alarms.len(),
            water_level_m = snapshot.reservoir.water_level_m,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "acquisition cycle succeeded"
        );

        CycleOutcome::Succeeded(snapshot)
    }

    /// An https dashboard cannot load plain-http feeds: the request would be
    /// blocked after burning the full timeout, so it is not attempted.
    fn check_transport_security(&self) -> Result<(), AcquisitionError> {
        if !self.config.dashboard.origin.starts_with("https://") {
            return Ok(());
        }
        for feed in Feed::ALL {
            let url = self.config.feed_url(feed);
            if url.starts_with("http://") {
                return Err(AcquisitionError::MixedSecurityContext {
                    feed,
                    url: url.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Fans the three fetches out to the worker pool and joins them.
    ///
    /// Every fetch has its own request timeout; the join itself is bounded
    /// by the cycle deadline, so a client that ignores its timeout cannot
    /// hold the cycle open. Results are evaluated only once all three are in
    /// (or the deadline passes).
    fn fetch_all(&self) -> Result<[String; 3], AcquisitionError> {
        let (tx, rx) = mpsc::channel::<FetchResult>();

        {
            let pool = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
            for feed in Feed::ALL {
                let client = Arc::clone(self.clients.get(feed));
                let tx = tx.clone();
                pool.execute(move || {
                    let started = Instant::now();
                    let result = client.fetch();
                    // receiver is gone if the cycle deadline already passed
                    let _ = tx.send((feed, result, started.elapsed()));
                });
            }
        }
        drop(tx);

        let cycle_deadline = self.config.cycle_deadline();
        let deadline = Instant::now() + cycle_deadline;
        let mut results: [Option<Result<String, AcquisitionError>>; 3] = [None, None, None];

        for _ in Feed::ALL {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((feed, result, elapsed)) => {
                    debug!(
                        feed = %feed,
                        ok = result.is_ok(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "feed fetch finished"
                    );
                    results[feed.index()] = Some(result);
                }
                // deadline reached, or every worker is done
                Err(_) => break,
            }
        }

        let [reservoir, alarms, rainfall] = results;
        Ok([
            confirmed(Feed::Reservoir, reservoir, cycle_deadline)?,
            confirmed(Feed::Alarms, alarms, cycle_deadline)?,
            confirmed(Feed::Rainfall, rainfall, cycle_deadline)?,
        ])
    }
}

fn decode(feed: Feed, body: &str) -> Result<Document, AcquisitionError> {
    Document::parse(body).ok_or(AcquisitionError::DecodeFailure { feed })
}

fn decode_all(bodies: [String; 3]) -> Result<[Document; 3], AcquisitionError> {
    let [reservoir, alarms, rainfall] = bodies;
    Ok([
        decode(Feed::Reservoir, &reservoir)?,
        decode(Feed::Alarms, &alarms)?,
        decode(Feed::Rainfall, &rainfall)?,
    ])
}

/// A feed counts only if its fetch reported success before the deadline.
fn confirmed(
    feed: Feed,
    result: Option<Result<String, AcquisitionError>>,
    cycle_deadline: Duration,
) -> Result<String, AcquisitionError> {
    match result {
        Some(result) => result,
        None => Err(AcquisitionError::SourceUnavailable {
            feed,
            reason: format!("timeout: no response within the {:?} cycle deadline", cycle_deadline),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
