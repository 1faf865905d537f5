/// Source clients for the three telemetry feeds.
///
/// Each client issues one plain GET against a fixed address with its own
/// deadline and hands back the raw body. Nothing is persisted and clients
/// share no mutable state, so the orchestrator can run all three at once.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::MonitorConfig;
use crate::model::{AcquisitionError, Feed};

/// Retrieves one feed's raw payload.
pub trait SourceClient: Send + Sync {
    fn feed(&self) -> Feed;

    /// Fetches the raw document body. Timeouts, transport errors and non-2xx
    /// responses all surface as `SourceUnavailable`.
    fn fetch(&self) -> Result<String, AcquisitionError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking HTTP client for one feed.
pub struct HttpSourceClient {
    feed: Feed,
    url: String,
    http: reqwest::blocking::Client,
}

impl HttpSourceClient {
    /// Builds a client whose whole request (connect, send, read body) must
    /// finish within `timeout`.
    pub fn new(feed: Feed, url: impl Into<String>, timeout: Duration) -> Result<Self, AcquisitionError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AcquisitionError::SourceUnavailable {
                feed,
                reason: format!("HTTP client setup failed: {}", e),
            })?;

        Ok(Self {
            feed,
            url: url.into(),
            http,
        })
    }

    /// Client for `feed` using the configured address and request timeout.
    pub fn for_feed(config: &MonitorConfig, feed: Feed) -> Result<Self, AcquisitionError> {
        Self::new(feed, config.feed_url(feed), config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn unavailable(&self, reason: String) -> AcquisitionError {
        AcquisitionError::SourceUnavailable {
            feed: self.feed,
            reason,
        }
    }
}

impl SourceClient for HttpSourceClient {
    fn feed(&self) -> Feed {
        self.feed
    }

    fn fetch(&self) -> Result<String, AcquisitionError> {
        let started = Instant::now();

        let response = self
            .http
            .get(&self.url)
            .send()
            .map_err(|e| self.unavailable(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP error: {}", status.as_u16())));
        }

        let body = response
            .text()
            .map_err(|e| self.unavailable(describe_transport_error(&e)))?;

        debug!(
            feed = %self.feed,
            url = %self.url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feed fetched"
        );

        Ok(body)
    }
}

/// Short reason string; `logging` keys its failure classification off the
/// "timeout" prefix.
fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("transport error: {}", e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
