/// Core data types for the reservoir telemetry service.
///
/// This module defines the shared domain model imported by all other modules:
/// the canonical readings produced by the normalizer, the `Snapshot` handed
/// to the dashboard, the operator-facing `Severity`, and the acquisition
/// error taxonomy. It contains no I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::status::{self, StatusCategory};

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

/// One of the three upstream telemetry documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    /// Reservoir hydrology: level, volume, storage rate, turbidity.
    Reservoir,
    /// Alarm station device states.
    Alarms,
    /// Evaporation and per-site rainfall.
    Rainfall,
}

impl Feed {
    /// All feeds, in the order a cycle reports them.
    pub const ALL: [Feed; 3] = [Feed::Reservoir, Feed::Alarms, Feed::Rainfall];

    pub fn index(self) -> usize {
        match self {
            Feed::Reservoir => 0,
            Feed::Alarms => 1,
            Feed::Rainfall => 2,
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Reservoir => write!(f, "reservoir"),
            Feed::Alarms => write!(f, "alarms"),
            Feed::Rainfall => write!(f, "rainfall"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Real-time hydrology for the reservoir.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservoirReading {
    pub name: Option<String>,
    /// Source timestamp, verbatim (no timezone conversion).
    pub observed_at: Option<String>,
    pub water_level_m: f64,
    /// Effective storage, in 10^4 m³.
    pub storage_volume_10k_m3: f64,
    /// Always 0–100, whatever encoding the feed used.
    pub storage_rate_pct: f64,
    pub turbidity_ntu: f64,
    pub avg_hour_rain_mm: Option<f64>,
    pub avg_day_rain_mm: Option<f64>,
}

/// Fixed rain gauge sites reported by the rainfall feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RainSite {
    East,
    West,
    WeirBody,
    WaterSupply,
    Office,
}

impl RainSite {
    pub const ALL: [RainSite; 5] = [
        RainSite::East,
        RainSite::West,
        RainSite::WeirBody,
        RainSite::WaterSupply,
        RainSite::Office,
    ];
}

/// Evaporation plus rainfall at each of the five gauge sites, in mm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallReading {
    pub observed_at: Option<String>,
    pub evaporation_mm: f64,
    pub east_mm: f64,
    pub west_mm: f64,
    pub weir_body_mm: f64,
    pub water_supply_mm: f64,
    pub office_mm: f64,
    pub average_rain_mm: Option<f64>,
}

impl RainfallReading {
    pub fn site(&self, site: RainSite) -> f64 {
        match site {
            RainSite::East => self.east_mm,
            RainSite::West => self.west_mm,
            RainSite::WeirBody => self.weir_body_mm,
            RainSite::WaterSupply => self.water_supply_mm,
            RainSite::Office => self.office_mm,
        }
    }

    /// Site quantities in fixed chart order.
    pub fn sites(&self) -> impl Iterator<Item = (RainSite, f64)> + '_ {
        RainSite::ALL.into_iter().map(move |s| (s, self.site(s)))
    }
}

/// The six device states an alarm station reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusField {
    Communication,
    MainsPower,
    Battery,
    Door,
    Amplifier,
    Trumpet,
}

impl StatusField {
    pub fn category(self) -> StatusCategory {
        match self {
            StatusField::Door => StatusCategory::Door,
            _ => StatusCategory::Generic,
        }
    }
}

/// One remote alarm station, with its raw status strings as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmStation {
    pub station_id: String,
    pub station_name: String,
    pub recorded_at: String,
    pub communication: String,
    pub mains_power: String,
    pub battery: String,
    pub door: String,
    pub amplifier: String,
    pub trumpet: String,
}

impl AlarmStation {
    pub fn statuses(&self) -> [(StatusField, &str); 6] {
        [
            (StatusField::Communication, self.communication.as_str()),
            (StatusField::MainsPower, self.mains_power.as_str()),
            (StatusField::Battery, self.battery.as_str()),
            (StatusField::Door, self.door.as_str()),
            (StatusField::Amplifier, self.amplifier.as_str()),
            (StatusField::Trumpet, self.trumpet.as_str()),
        ]
    }

    /// Worst severity across the six statuses. Danger outranks warning,
    /// warning outranks success, and a station with nothing but empty
    /// statuses is secondary.
    pub fn overall_severity(&self) -> Severity {
        self.statuses()
            .into_iter()
            .map(|(field, raw)| status::classify(Some(raw), field.category()))
            .max_by_key(|s| s.rank())
            .unwrap_or(Severity::Secondary)
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Operator-facing classification of a raw sensor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
    /// Unknown or no data. Not an error.
    Secondary,
}

impl Severity {
    /// Ordering used when rolling several statuses up into one.
    fn rank(self) -> u8 {
        match self {
            Severity::Secondary => 0,
            Severity::Success => 1,
            Severity::Warning => 2,
            Severity::Danger => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
            Severity::Secondary => write!(f, "secondary"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One complete reading of all three feeds.
///
/// Reservoir and rainfall are always present. Alarms are either the full
/// list from one successful fetch or the fallback list, never a mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub reservoir: ReservoirReading,
    pub rainfall: RainfallReading,
    pub alarms: Vec<AlarmStation>,
    pub sourced_from_fallback: bool,
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons an acquisition cycle fails. None of these reach the dashboard as
/// errors; the orchestrator substitutes the fallback snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcquisitionError {
    /// Timeout, transport failure, or non-2xx response.
    #[error("{feed} feed unavailable: {reason}")]
    SourceUnavailable { feed: Feed, reason: String },

    /// The payload was not a well-formed document.
    #[error("{feed} feed returned a malformed document")]
    DecodeFailure { feed: Feed },

    /// An https dashboard cannot load plain-http feeds; not attempted.
    #[error("refusing plain-http {feed} feed {url} from an https dashboard")]
    MixedSecurityContext { feed: Feed, url: String },
}

impl AcquisitionError {
    pub fn feed(&self) -> Feed {
        match self {
            AcquisitionError::SourceUnavailable { feed, .. }
            | AcquisitionError::DecodeFailure { feed }
            | AcquisitionError::MixedSecurityContext { feed, .. } => *feed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
