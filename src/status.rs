//! Alarm station status classification.
//!
//! Maps the raw status strings reported by the alarm feed onto the four
//! operator-facing severity tiers. The only way to reach `Success` is an
//! exact known-good literal; anything unrecognized is treated as an anomaly.
//!
//! The upstream feed reports statuses in its native vocabulary (`正常`,
//! `開啟`, `斷線`, ...). The English literals are accepted alongside them.

use crate::model::Severity;

/// How a status string should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Generic,
    Door,
}

/// Substrings that mark a fault regardless of category.
pub const FAULT_KEYWORDS: &[&str] = &["fault", "abnormal", "disconnected", "故障", "異常", "斷線"];

pub const DOOR_OPEN: &[&str] = &["open", "開啟"];
pub const DOOR_CLOSED: &[&str] = &["closed", "關閉"];

/// Exact literals that count as healthy for generic fields.
pub const KNOWN_GOOD: &[&str] = &[
    "normal",
    "communication-normal",
    "closed",
    "正常",
    "通訊正常",
    "關閉",
];

/// Classifies one raw status. First match wins:
///
/// 1. contains a fault keyword → `Danger` (even for doors)
/// 2. door: open → `Warning`, closed → `Success`
/// 3. generic: known-good literal → `Success`
/// 4. any other non-empty value → `Danger`, for doors too
/// 5. empty or absent → `Secondary`
pub fn classify(raw: Option<&str>, category: StatusCategory) -> Severity {
    let value = raw.map(str::trim).unwrap_or("");

    if FAULT_KEYWORDS.iter().any(|k| value.contains(k)) {
        return Severity::Danger;
    }

    let healthy = match category {
        StatusCategory::Door => {
            if DOOR_OPEN.contains(&value) {
                return Severity::Warning;
            }
            DOOR_CLOSED.contains(&value)
        }
        StatusCategory::Generic => KNOWN_GOOD.contains(&value),
    };

    if healthy {
        Severity::Success
    } else if !value.is_empty() {
        Severity::Danger
    } else {
        Severity::Secondary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
