/// Service configuration loader - parses reservoir.toml
///
/// Keeps feed addresses and polling deadlines out of the code, so a
/// deployment can point at a different data service or tighten timeouts
/// without recompiling. Every section is optional; missing values fall back
/// to the reference deployment's settings.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::model::Feed;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "reservoir.toml";

/// Errors from loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Configuration structures
// ---------------------------------------------------------------------------

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub feeds: FeedsConfig,
    pub polling: PollingConfig,
    pub dashboard: DashboardConfig,
}

/// Fixed upstream addresses, one per feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub reservoir_url: String,
    pub alarms_url: String,
    pub rainfall_url: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            reservoir_url: "http://127.0.0.1:5080/api/ReservoirRtInfo".to_string(),
            alarms_url: "http://127.0.0.1:5080/api/AlarmStationInfo".to_string(),
            rainfall_url: "http://127.0.0.1:5080/api/EvapRainInfo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between scheduled cycles (reference deployment: 60).
    pub interval_secs: u64,
    /// Per-feed request deadline.
    pub request_timeout_secs: u64,
    /// Upper bound on a whole cycle, join included.
    pub cycle_deadline_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            request_timeout_secs: 4,
            cycle_deadline_secs: 5,
        }
    }
}

/// Where the dashboard consuming the snapshots is served from. Only the
/// scheme matters: an https origin cannot load plain-http feeds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub origin: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn feed_url(&self, feed: Feed) -> &str {
        match feed {
            Feed::Reservoir => &self.feeds.reservoir_url,
            Feed::Alarms => &self.feeds.alarms_url,
            Feed::Rainfall => &self.feeds.rainfall_url,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.polling.request_timeout_secs)
    }

    pub fn cycle_deadline(&self) -> Duration {
        Duration::from_secs(self.polling.cycle_deadline_secs)
    }

    /// Rejects settings that would let a cycle hang or never run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Invalid("polling.interval_secs must be > 0".into()));
        }
        if self.polling.request_timeout_secs == 0 || self.polling.cycle_deadline_secs == 0 {
            return Err(ConfigError::Invalid("polling deadlines must be > 0".into()));
        }
        if self.polling.request_timeout_secs > self.polling.cycle_deadline_secs {
            return Err(ConfigError::Invalid(format!(
                "polling.request_timeout_secs ({}) exceeds polling.cycle_deadline_secs ({})",
                self.polling.request_timeout_secs, self.polling.cycle_deadline_secs
            )));
        }
        for feed in Feed::ALL {
            let url = self.feed_url(feed);
            if !is_http_url(url) {
                return Err(ConfigError::Invalid(format!(
                    "{} feed url must be http:// or https://, got {:?}",
                    feed, url
                )));
            }
        }
        if !is_http_url(&self.dashboard.origin) {
            return Err(ConfigError::Invalid(format!(
                "dashboard.origin must be http:// or https://, got {:?}",
                self.dashboard.origin
            )));
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str, path: &str) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from `path`.
///
/// A missing file is not an error: the service runs with the defaults. A
/// file that exists but does not parse or validate is.
pub fn load_config(path: impl AsRef<Path>) -> Result<MonitorConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    if !path.exists() {
        let config = MonitorConfig::default();
        config.validate()?;
        return Ok(config);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;

    parse_config(&contents, &display)
}
