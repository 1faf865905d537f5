/// HTTP endpoint for the dashboard
///
/// Serves the latest snapshot together with its derived severities, so the
/// presentation layer never classifies status strings itself.
///
/// Endpoints:
/// - GET /snapshot - Latest snapshot, per-station severities, degraded banner
/// - POST /refresh - Run a cycle now (409 if one is already in flight)
/// - GET /health - Service health check

use std::io::Cursor;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::{AlarmStation, Severity, Snapshot};
use crate::scheduler::{CycleState, PollTrigger, Scheduler};
use crate::status::classify;

type JsonResponse = tiny_http::Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Snapshot plus everything the dashboard derives from it
#[derive(Debug, Serialize)]
pub struct SnapshotResponse<'a> {
    pub snapshot: &'a Snapshot,
    pub stations: Vec<StationSeverity<'a>>,

    /// True when the snapshot is fallback data
    pub degraded: bool,
    /// Why the last cycle failed, for the degraded-mode banner
    pub banner: Option<String>,
}

/// Severity of each status field of one alarm station
#[derive(Debug, Serialize)]
pub struct StationSeverity<'a> {
    pub station_id: &'a str,
    pub communication: Severity,
    pub mains_power: Severity,
    pub battery: Severity,
    pub door: Severity,
    pub amplifier: Severity,
    pub trumpet: Severity,
    pub overall: Severity,
}

impl<'a> StationSeverity<'a> {
    pub fn of(station: &'a AlarmStation) -> Self {
        let [communication, mains_power, battery, door, amplifier, trumpet] = station
            .statuses()
            .map(|(field, raw)| classify(Some(raw), field.category()));
        Self {
            station_id: &station.station_id,
            communication,
            mains_power,
            battery,
            door,
            amplifier,
            trumpet,
            overall: station.overall_severity(),
        }
    }
}

pub fn build_snapshot_response<'a>(
    snapshot: &'a Snapshot,
    last_failure: Option<String>,
) -> SnapshotResponse<'a> {
    SnapshotResponse {
        snapshot,
        stations: snapshot.alarms.iter().map(StationSeverity::of).collect(),
        degraded: snapshot.sourced_from_fallback,
        banner: last_failure.filter(|_| snapshot.sourced_from_fallback),
    }
}

fn cycle_state_label(state: CycleState) -> &'static str {
    match state {
        CycleState::Idle => "idle",
        CycleState::Fetching => "fetching",
        CycleState::Succeeded => "succeeded",
        CycleState::Failed => "failed",
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(port: u16, scheduler: Arc<Scheduler>) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    info!(port, "HTTP endpoint listening (GET /snapshot, POST /refresh, GET /health)");

    for request in server.incoming_requests() {
        let response = route(&scheduler, request.method(), request.url());
        if let Err(e) = request.respond(response) {
            warn!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

/// Dispatch one request. Separate from the server loop so it can be
/// exercised without a socket.
pub fn route(scheduler: &Scheduler, method: &tiny_http::Method, url: &str) -> JsonResponse {
    use tiny_http::Method;

    // ignore any query string
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (Method::Get, "/health") => handle_health(scheduler),
        (Method::Get, "/snapshot") => handle_snapshot(scheduler),
        (Method::Post, "/refresh") => handle_refresh(scheduler),
        _ => create_response(
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["GET /snapshot", "POST /refresh", "GET /health"]
            }),
        ),
    }
}

/// Handle /health endpoint
fn handle_health(scheduler: &Scheduler) -> JsonResponse {
    create_response(
        200,
        serde_json::json!({
            "status": "ok",
            "service": "resmon_service",
            "version": env!("CARGO_PKG_VERSION"),
            "cycle_state": cycle_state_label(scheduler.state()),
        }),
    )
}

/// Handle /snapshot endpoint
fn handle_snapshot(scheduler: &Scheduler) -> JsonResponse {
    match scheduler.latest() {
        Some(snapshot) => {
            let body = build_snapshot_response(&snapshot, scheduler.last_failure());
            create_response(200, to_json(&body))
        }
        None => create_response(
            503,
            serde_json::json!({
                "error": "No snapshot yet",
                "cycle_state": cycle_state_label(scheduler.state()),
            }),
        ),
    }
}

/// Handle /refresh endpoint
fn handle_refresh(scheduler: &Scheduler) -> JsonResponse {
    match scheduler.refresh() {
        PollTrigger::Ran(snapshot) => {
            let body = build_snapshot_response(&snapshot, scheduler.last_failure());
            create_response(202, to_json(&body))
        }
        PollTrigger::AlreadyInFlight | PollTrigger::NotDue => create_response(
            409,
            serde_json::json!({
                "error": "A cycle is already in flight",
                "cycle_state": cycle_state_label(scheduler.state()),
            }),
        ),
    }
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Failed to serialize response: {}", e) })
    })
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());

    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));
    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
