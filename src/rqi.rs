//! Road Quality Index estimation.
//!
//! The RQI is a 1-10 score where higher means a smoother road. It is a step
//! function of the mean square of the three vibration channels; severity is
//! in turn a step function of the RQI.

use serde::{Deserialize, Serialize};

// ---

/// `(upper bound on mean square, rqi)` pairs, checked in order.
const RQI_STEPS: [(f64, f64); 4] = [(0.1, 9.5), (0.5, 8.5), (1.0, 7.0), (2.0, 5.5)];

/// Score for readings at or above the last step.
const RQI_FLOOR: f64 = 3.0;

const HIGH_SEVERITY_BELOW: f64 = 5.0;
const MEDIUM_SEVERITY_BELOW: f64 = 7.0;

/// Mean of the squared channel values.
pub fn mean_squared(v1: f64, v2: f64, v3: f64) -> f64 {
    (v1 * v1 + v2 * v2 + v3 * v3) / 3.0
}

/// Map three channel values to an RQI score, rounded to 2 decimals.
pub fn estimate_rqi(v1: f64, v2: f64, v3: f64) -> f64 {
    // ---
    let ms = mean_squared(v1, v2, v3);
    let rqi = RQI_STEPS
        .iter()
        .find(|(upper, _)| ms < *upper)
        .map(|(_, rqi)| *rqi)
        .unwrap_or(RQI_FLOOR);
    round_to(rqi, 2)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    // ---
    pub fn from_rqi(rqi: f64) -> Self {
        if rqi < HIGH_SEVERITY_BELOW {
            Severity::High
        } else if rqi < MEDIUM_SEVERITY_BELOW {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// High and medium readings raise alerts.
    pub fn is_alert(self) -> bool {
        matches!(self, Severity::High | Severity::Medium)
    }

    /// Alert priority: 3 for high, 2 for medium, 1 otherwise.
    pub fn priority(self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}
