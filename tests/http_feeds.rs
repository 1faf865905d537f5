/// Integration tests for the HTTP source clients
///
/// Serves canned feed documents from a local tiny_http server and points
/// real clients at it:
/// 1. A full cycle over HTTP produces a live snapshot
/// 2. Non-2xx responses and silent servers surface as SourceUnavailable
/// 3. The mixed-security guard refuses before any request is sent
///
/// Binds only to 127.0.0.1; no external network access required.

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use resmon_service::acquisition::{CycleOutcome, Orchestrator};
use resmon_service::config::MonitorConfig;
use resmon_service::ingest::client::{HttpSourceClient, SourceClient};
use resmon_service::model::{AcquisitionError, Feed};
use resmon_service::scheduler::SystemClock;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const RESERVOIR_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ReservoirRtInfo>
  <ReservoirName>烏山頭水庫</ReservoirName>
  <WaterLevel>56.45</WaterLevel>
  <Volume>432.1</Volume>
  <VolumeRate>78.5</VolumeRate>
  <Turbidity>12</Turbidity>
</ReservoirRtInfo>"#;

const ALARMS_XML: &str = r#"<ArrayOfAlarmStationInfo>
  <AlarmStationInfo>
    <StationID>S003</StationID>
    <StationName>東口監測站</StationName>
    <CmdName>斷線</CmdName>
  </AlarmStationInfo>
</ArrayOfAlarmStationInfo>"#;

const RAINFALL_XML: &str = r#"<EvapRainInfo>
  <Evaporation>2.5</Evaporation>
  <EastSideRainQty>12.0</EastSideRainQty>
  <OfficeRainQty>-999</OfficeRainQty>
</EvapRainInfo>"#;

/// Local feed server. Returns its base URL and a request counter.
fn start_feed_server() -> (String, Arc<AtomicUsize>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind local feed server");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("feed server listens on an IP address");
    let requests = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&requests);
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            counter.fetch_add(1, Ordering::SeqCst);
            let (status, body): (u16, &str) = match request.url() {
                "/api/ReservoirRtInfo" => (200, RESERVOIR_XML),
                "/api/AlarmStationInfo" => (200, ALARMS_XML),
                "/api/EvapRainInfo" => (200, RAINFALL_XML),
                "/api/broken" => (500, "<html><body>Internal Server Error</body></html>"),
                _ => (404, "not found"),
            };
            let response = tiny_http::Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });

    (format!("http://{}", addr), requests)
}

fn config_for(base: &str) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.feeds.reservoir_url = format!("{}/api/ReservoirRtInfo", base);
    config.feeds.alarms_url = format!("{}/api/AlarmStationInfo", base);
    config.feeds.rainfall_url = format!("{}/api/EvapRainInfo", base);
    config
}

// ---------------------------------------------------------------------------
// 1. Live cycle
// ---------------------------------------------------------------------------

#[test]
fn test_full_cycle_over_http() {
    let (base, requests) = start_feed_server();
    let orch = Orchestrator::from_config(config_for(&base), Arc::new(SystemClock))
        .expect("clients should build");

    let snapshot = match orch.acquire() {
        CycleOutcome::Succeeded(snapshot) => snapshot,
        other => panic!("expected a live snapshot, got {:?}", other),
    };

    assert!(!snapshot.sourced_from_fallback);
    assert_eq!(snapshot.reservoir.storage_rate_pct, 78.5);
    assert_eq!(snapshot.rainfall.office_mm, 0.0);
    assert_eq!(snapshot.alarms.len(), 1);
    assert_eq!(snapshot.alarms[0].communication, "斷線");
    assert_eq!(requests.load(Ordering::SeqCst), 3);
}

// ---------------------------------------------------------------------------
// 2. Failures
// ---------------------------------------------------------------------------

#[test]
fn test_server_error_is_source_unavailable() {
    let (base, _) = start_feed_server();
    let client = HttpSourceClient::new(Feed::Alarms, format!("{}/api/broken", base), Duration::from_secs(2))
        .expect("client should build");

    match client.fetch() {
        Err(AcquisitionError::SourceUnavailable { feed, reason }) => {
            assert_eq!(feed, Feed::Alarms);
            assert_eq!(reason, "HTTP error: 500");
        }
        other => panic!("expected SourceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_error_page_fails_the_whole_cycle() {
    let (base, _) = start_feed_server();
    let mut config = config_for(&base);
    config.feeds.rainfall_url = format!("{}/api/broken", base);

    let orch = Orchestrator::from_config(config, Arc::new(SystemClock)).expect("clients should build");

    let snapshot = orch.poll();
    assert!(snapshot.sourced_from_fallback);
}

#[test]
fn test_silent_server_times_out() {
    // Accepts connections (backlog) but never answers
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent listener");
    let addr = listener.local_addr().expect("listener address");

    let client = HttpSourceClient::new(Feed::Reservoir, format!("http://{}/", addr), Duration::from_secs(1))
        .expect("client should build");

    let started = Instant::now();
    let result = client.fetch();

    assert!(started.elapsed() < Duration::from_secs(5), "request must honor its timeout");
    match result {
        Err(AcquisitionError::SourceUnavailable { reason, .. }) => {
            assert!(reason.starts_with("timeout"), "unexpected reason: {}", reason)
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    drop(listener);
}

// ---------------------------------------------------------------------------
// 3. Mixed security
// ---------------------------------------------------------------------------

#[test]
fn test_mixed_security_sends_no_requests() {
    let (base, requests) = start_feed_server();
    let mut config = config_for(&base);
    config.dashboard.origin = "https://dashboard.example.org".to_string();

    let orch = Orchestrator::from_config(config, Arc::new(SystemClock)).expect("clients should build");

    assert!(matches!(
        orch.acquire(),
        CycleOutcome::Failed(AcquisitionError::MixedSecurityContext { .. })
    ));
    assert_eq!(requests.load(Ordering::SeqCst), 0);
}
