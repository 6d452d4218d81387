//! Read-only views over the readings of one rebuild.

use std::collections::BTreeMap;

use crate::{
    models::{
        Alert, DailyTrend, DashboardStats, DatePotholes, MunicipalityStats, PotholeSummary,
        SensorReading, CHANDIGARH_MC, MOHALI_MC,
    },
    rqi::round_to,
};

// ---

/// Potholes per day assumed to still be awaiting repair.
const REPAIR_BACKLOG: u64 = 5;

const KM_PER_READING: f64 = 0.1;

/// One alert per high or medium severity reading, numbered over the alerts.
pub fn alerts(readings: &[SensorReading]) -> Vec<Alert> {
    // ---
    readings
        .iter()
        .filter(|r| r.severity.is_alert())
        .enumerate()
        .map(|(i, r)| Alert {
            id: format!("alert_{}", i + 1),
            kind: "road_quality",
            title: format!("Road Issue on {}", r.road_name),
            description: format!("RQI: {:?}, Potholes: {}", r.rqi, r.pothole_count),
            severity: r.severity,
            latitude: r.latitude,
            longitude: r.longitude,
            municipality: r.municipality.clone(),
            timestamp: r.timestamp.clone(),
            status: "active",
            priority: r.severity.priority(),
        })
        .collect()
}

#[derive(Default)]
struct DayTotals {
    potholes: u64,
    rqi_sum: f64,
    count: u64,
}

/// Daily totals keyed by the date prefix of the timestamp, oldest first.
pub fn trends(readings: &[SensorReading]) -> Vec<DailyTrend> {
    // ---
    let mut days: BTreeMap<String, DayTotals> = BTreeMap::new();
    for r in readings {
        let day = days.entry(r.date_key()).or_default();
        day.potholes += u64::from(r.pothole_count);
        day.rqi_sum += r.rqi;
        day.count += 1;
    }

    days.into_iter()
        .map(|(date, day)| DailyTrend {
            date,
            potholes_detected: day.potholes,
            repairs_completed: day.potholes.saturating_sub(REPAIR_BACKLOG),
            average_rqi: round_to(day.rqi_sum / day.count as f64, 2),
            active_alerts: day.potholes,
            sensors_active: day.count,
            road_coverage_km: round_to(day.count as f64 * KM_PER_READING, 1),
        })
        .collect()
}

/// Rollup for the two known municipalities; other names are ignored.
pub fn municipalities(readings: &[SensorReading]) -> Vec<MunicipalityStats> {
    // ---
    let mut stats = [
        MunicipalityStats {
            name: MOHALI_MC,
            city: "Mohali",
            state: "Punjab",
            total_sensors: 0,
            active_alerts: 0,
            total_potholes: 0,
        },
        MunicipalityStats {
            name: CHANDIGARH_MC,
            city: "Chandigarh",
            state: "Chandigarh",
            total_sensors: 0,
            active_alerts: 0,
            total_potholes: 0,
        },
    ];

    for r in readings {
        let Some(entry) = stats.iter_mut().find(|m| m.name == r.municipality) else {
            continue;
        };
        entry.total_sensors += 1;
        entry.total_potholes += u64::from(r.pothole_count);
        if r.severity.is_alert() {
            entry.active_alerts += 1;
        }
    }

    stats.into()
}

pub fn dashboard_stats(readings: &[SensorReading]) -> DashboardStats {
    // ---
    let total_sensors = readings.len() as u64;
    let total_potholes = readings.iter().map(|r| u64::from(r.pothole_count)).sum();
    let active_alerts = readings.iter().filter(|r| r.severity.is_alert()).count() as u64;
    let average_rqi = if readings.is_empty() {
        0.0
    } else {
        readings.iter().map(|r| r.rqi).sum::<f64>() / readings.len() as f64
    };

    DashboardStats {
        total_sensors,
        active_alerts,
        total_potholes,
        average_rqi: round_to(average_rqi, 2),
    }
}

/// Pothole totals overall and per day.
pub fn pothole_summary(readings: &[SensorReading]) -> PotholeSummary {
    // ---
    let mut by_date: BTreeMap<String, u64> = BTreeMap::new();
    for r in readings {
        *by_date.entry(r.date_key()).or_default() += u64::from(r.pothole_count);
    }

    PotholeSummary {
        total_potholes: by_date.values().sum(),
        by_date: by_date
            .into_iter()
            .map(|(date, potholes)| DatePotholes { date, potholes })
            .collect(),
    }
}
