/// Maps decoded feed documents into the canonical readings.
///
/// Every function here is pure: the same document always produces the same
/// reading. Absent numeric fields become 0.0 so downstream formatting never
/// special-cases missing data; only the fields the model types as `Option`
/// distinguish "absent" from zero.

use crate::ingest::wire::{Node, number, optional_number, text};
use crate::model::{AlarmStation, RainfallReading, ReservoirReading};

/// Repeated record element in the alarm feed.
pub const ALARM_RECORD: &str = "AlarmStationInfo";

// ---------------------------------------------------------------------------
// Encoding fixes
// ---------------------------------------------------------------------------

/// Normalizes the reservoir storage rate to a 0–100 percentage.
///
/// The feed has reported this field both as a fraction (0.785) and as a
/// percentage (78.5), and the value does not say which. Values of 1.0 and
/// above are taken as percentages; anything below is scaled by 100. A
/// reservoir at exactly 1 % and one at 100 % both arrive as `1`, so the
/// boundary is ambiguous by construction until the upstream schema is pinned
/// down.
pub fn normalize_storage_rate(raw: f64) -> f64 {
    let pct = if raw >= 1.0 { raw } else { raw * 100.0 };
    pct.clamp(0.0, 100.0)
}

/// Quantities that cannot be negative. The data service reports missing
/// gauges with negative sentinels (e.g. `-999`); those read as 0.0.
fn non_negative(value: f64) -> f64 {
    if value < 0.0 { 0.0 } else { value }
}

fn optional_text(node: &Node, field: &str) -> Option<String> {
    let value = text(node, field);
    if value.is_empty() { None } else { Some(value) }
}

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

pub fn normalize_reservoir(doc: &Node) -> ReservoirReading {
    ReservoirReading {
        name: optional_text(doc, "ReservoirName"),
        observed_at: optional_text(doc, "RecDateTime"),
        water_level_m: number(doc, "WaterLevel"),
        storage_volume_10k_m3: number(doc, "Volume"),
        storage_rate_pct: normalize_storage_rate(number(doc, "VolumeRate")),
        turbidity_ntu: non_negative(number(doc, "Turbidity")),
        avg_hour_rain_mm: optional_number(doc, "AverageHourRainQty").map(non_negative),
        avg_day_rain_mm: optional_number(doc, "AverageDayRainQty").map(non_negative),
    }
}

pub fn normalize_rainfall(doc: &Node) -> RainfallReading {
    RainfallReading {
        observed_at: optional_text(doc, "RecDateTime"),
        evaporation_mm: number(doc, "Evaporation"),
        east_mm: non_negative(number(doc, "EastSideRainQty")),
        west_mm: non_negative(number(doc, "WestSideRainQty")),
        weir_body_mm: non_negative(number(doc, "WeirBodyRainQty")),
        water_supply_mm: non_negative(number(doc, "WaterSupplyRainQty")),
        office_mm: non_negative(number(doc, "OfficeRainQty")),
        average_rain_mm: optional_number(doc, "AverageRainQty").map(non_negative),
    }
}

/// One `AlarmStation` per `AlarmStationInfo` record, in feed order. Status
/// strings are kept raw; classification happens at display time.
pub fn normalize_alarms(doc: &Node) -> Vec<AlarmStation> {
    doc.descendants(ALARM_RECORD)
        .into_iter()
        .map(|record| AlarmStation {
            station_id: text(record, "StationID"),
            station_name: text(record, "StationName"),
            recorded_at: text(record, "RecDateTime"),
            communication: text(record, "CmdName"),
            mains_power: text(record, "Powered"),
            battery: text(record, "DC"),
            door: text(record, "Door"),
            amplifier: text(record, "Amp"),
            trumpet: text(record, "Trumpet"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
