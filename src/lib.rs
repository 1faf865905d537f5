/// resmon_service: reservoir telemetry acquisition for the operations dashboard.
///
/// # Module structure
///
/// ```text
/// resmon_service
/// ├── model       — shared data types (ReservoirReading, AlarmStation, Snapshot, AcquisitionError, …)
/// ├── config      — feed addresses, timeouts and dashboard origin (reservoir.toml)
/// ├── status      — status-string → severity classifier
/// ├── logging     — tracing subscriber setup + failure classification
/// ├── ingest
/// │   ├── client    — blocking HTTP source client, one per feed
/// │   ├── wire      — XML document decoding and field accessors
/// │   ├── normalize — wire documents → typed readings
/// │   └── fixtures (test only) — representative feed payloads
/// ├── acquisition — concurrent poll cycle, all-or-nothing outcome, fallback snapshot
/// ├── scheduler   — poll interval, in-flight guard, injectable clock
/// ├── daemon      — main poll loop
/// └── endpoint    — HTTP API for the dashboard (snapshot, refresh, health)
/// ```

/// Public modules
pub mod acquisition;
pub mod config;
pub mod daemon;
pub mod endpoint;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod status;
