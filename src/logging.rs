/// Structured logging for the reservoir telemetry service
///
/// Sets up the `tracing` subscriber and classifies acquisition failures so
/// the log level reflects how surprising a failure is: a refused
/// mixed-security request is a known deployment condition, a timeout is
/// routine on the reservoir's links, a malformed document or a refused
/// connection means something upstream changed.

use std::fmt;
use std::str::FromStr;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::model::AcquisitionError;

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Deployment condition the operator already knows about
    Expected,
    /// Routine flakiness of the upstream links
    Transient,
    /// Indicates the upstream service or its format changed
    Unexpected,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Transient => write!(f, "TRANSIENT"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
        }
    }
}

pub fn classify_failure(err: &AcquisitionError) -> FailureType {
    match err {
        AcquisitionError::MixedSecurityContext { .. } => FailureType::Expected,
        AcquisitionError::SourceUnavailable { reason, .. } if reason.starts_with("timeout") => {
            FailureType::Transient
        }
        AcquisitionError::SourceUnavailable { reason, .. } if reason.starts_with("HTTP error: 5") => {
            FailureType::Transient
        }
        AcquisitionError::SourceUnavailable { .. } | AcquisitionError::DecodeFailure { .. } => {
            FailureType::Unexpected
        }
    }
}

/// Logs a failed cycle at the level its classification calls for.
pub fn log_cycle_failure(err: &AcquisitionError) {
    let failure_type = classify_failure(err);
    match failure_type {
        FailureType::Expected | FailureType::Transient => {
            warn!(feed = %err.feed(), kind = %failure_type, "acquisition failed, serving fallback: {}", err)
        }
        FailureType::Unexpected => {
            error!(feed = %err.feed(), kind = %failure_type, "acquisition failed, serving fallback: {}", err)
        }
    }
}
