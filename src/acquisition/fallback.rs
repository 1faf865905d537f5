//! Fixed snapshot served when live acquisition fails.
//!
//! Reference values from the Wushantou reservoir, with four alarm stations in
//! the data service's own vocabulary. Three of them are deliberately
//! unhealthy so a degraded dashboard still shows every severity tier.

use chrono::{DateTime, Utc};

use crate::model::{AlarmStation, RainfallReading, ReservoirReading, Snapshot};

pub fn fallback_snapshot(fetched_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        reservoir: fallback_reservoir(),
        rainfall: fallback_rainfall(),
        alarms: fallback_alarms(),
        sourced_from_fallback: true,
        fetched_at,
    }
}

fn fallback_reservoir() -> ReservoirReading {
    ReservoirReading {
        name: Some("烏山頭水庫".to_string()),
        observed_at: None,
        water_level_m: 56.45,
        storage_volume_10k_m3: 432.1,
        storage_rate_pct: 78.5,
        turbidity_ntu: 12.0,
        avg_hour_rain_mm: None,
        avg_day_rain_mm: Some(4.2),
    }
}

fn fallback_rainfall() -> RainfallReading {
    RainfallReading {
        observed_at: None,
        evaporation_mm: 2.5,
        east_mm: 12.0,
        west_mm: 5.5,
        weir_body_mm: 0.0,
        water_supply_mm: 1.2,
        office_mm: 0.0,
        average_rain_mm: None,
    }
}

fn station(id: &str, name: &str, recorded_at: &str, statuses: [&str; 6]) -> AlarmStation {
    let [communication, mains_power, battery, door, amplifier, trumpet] = statuses;
    AlarmStation {
        station_id: id.to_string(),
        station_name: name.to_string(),
        recorded_at: recorded_at.to_string(),
        communication: communication.to_string(),
        mains_power: mains_power.to_string(),
        battery: battery.to_string(),
        door: door.to_string(),
        amplifier: amplifier.to_string(),
        trumpet: trumpet.to_string(),
    }
}

fn fallback_alarms() -> Vec<AlarmStation> {
    vec![
        station(
            "S001",
            "大壩控制站",
            "2023-10-27 10:00:00",
            ["通訊正常", "正常", "正常", "關閉", "正常", "正常"],
        ),
        station(
            "S002",
            "西口監測站",
            "2023-10-27 10:05:00",
            ["通訊正常", "異常", "正常", "開啟", "正常", "正常"],
        ),
        station(
            "S003",
            "東口監測站",
            "2023-10-27 09:55:00",
            ["斷線", "", "", "", "", ""],
        ),
        station(
            "S004",
            "送水管理站",
            "2023-10-27 10:01:00",
            ["通訊正常", "正常", "電壓過低", "關閉", "正常", "故障"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, StatusField};
    use crate::status::classify;

    #[test]
    fn test_fallback_is_flagged_and_complete() {
        let now = Utc::now();
        let snapshot = fallback_snapshot(now);
        assert!(snapshot.sourced_from_fallback);
        assert_eq!(snapshot.fetched_at, now);
        assert_eq!(snapshot.alarms.len(), 4);
        assert_eq!(snapshot.reservoir.water_level_m, 56.45);
        assert_eq!(snapshot.rainfall.east_mm, 12.0);
    }

    #[test]
    fn test_fallback_storage_rate_is_a_percentage() {
        let snapshot = fallback_snapshot(Utc::now());
        assert!((0.0..=100.0).contains(&snapshot.reservoir.storage_rate_pct));
    }

    #[test]
    fn test_fallback_covers_every_severity_tier() {
        let snapshot = fallback_snapshot(Utc::now());
        let severities: Vec<Severity> = snapshot
            .alarms
            .iter()
            .flat_map(|s| {
                s.statuses()
                    .into_iter()
                    .map(|(field, raw)| classify(Some(raw), field.category()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for tier in [Severity::Success, Severity::Warning, Severity::Danger, Severity::Secondary] {
            assert!(severities.contains(&tier), "fallback should show {}", tier);
        }
    }

    #[test]
    fn test_fallback_west_station_door_is_open() {
        let snapshot = fallback_snapshot(Utc::now());
        let west = &snapshot.alarms[1];
        let door = west
            .statuses()
            .into_iter()
            .find(|(field, _)| *field == StatusField::Door)
            .map(|(_, raw)| raw);
        assert_eq!(door, Some("開啟"));
    }
}
