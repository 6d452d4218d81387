//! Data models for the road quality pipeline.
//!
//! `CsvRow` is one raw line of a sensor upload; `CsvRow::normalize` turns it
//! into a typed `NormalizedRow`. Everything else is a response shape built
//! from the readings of a single rebuild.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::rqi::Severity;

// ---

pub const MOHALI_MC: &str = "Mohali Municipal Corporation";
pub const CHANDIGARH_MC: &str = "Chandigarh Municipal Corporation";

/// Raw CSV row. Every column is optional at this stage so that a missing
/// column is reported as a malformed record rather than a CSV decode error.
///
/// Text columns are `None` only when the column is absent; an empty cell is
/// `Some("")`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CsvRow {
    // ---
    #[serde(rename = "Time", deserialize_with = "present_text")]
    pub time: Option<String>,
    #[serde(rename = "SensorType", deserialize_with = "present_text")]
    pub sensor_type: Option<String>,
    #[serde(rename = "Value1")]
    pub value1: Option<String>,
    #[serde(rename = "Value2")]
    pub value2: Option<String>,
    #[serde(rename = "Value3")]
    pub value3: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "Pothole")]
    pub pothole: Option<String>,
}

/// A CSV row with typed fields and a normalized timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub timestamp: String,
    pub sensor_type: String,
    pub values: [f64; 3],
    pub latitude: f64,
    pub longitude: f64,
    pub pothole_count: u32,
}

impl CsvRow {
    // ---
    /// Validate and type the row. The error is a human readable reason; the
    /// caller attaches file and line information.
    pub fn normalize(&self, today: NaiveDate) -> Result<NormalizedRow, String> {
        // ---
        let time = self.time.as_deref().ok_or("missing Time column")?;
        let sensor_type = self
            .sensor_type
            .clone()
            .ok_or("missing SensorType column")?;
        let latitude = parse_number("Latitude", required("Latitude", &self.latitude)?)?;
        let longitude = parse_number("Longitude", required("Longitude", &self.longitude)?)?;

        let values = [
            optional_number("Value1", &self.value1)?,
            optional_number("Value2", &self.value2)?,
            optional_number("Value3", &self.value3)?,
        ];

        let pothole = parse_number("Pothole", required("Pothole", &self.pothole)?)?;
        if !pothole.is_finite() || pothole < 0.0 {
            return Err(format!("Pothole must be a non-negative number, got {pothole}"));
        }
        if pothole.trunc() > f64::from(u32::MAX) {
            return Err(format!("Pothole count out of range: {pothole}"));
        }

        Ok(NormalizedRow {
            timestamp: normalize_timestamp(time, today),
            sensor_type,
            values,
            latitude,
            longitude,
            pothole_count: pothole.trunc() as u32,
        })
    }
}

fn present_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    String::deserialize(d).map(Some)
}

fn required<'a>(column: &str, value: &'a Option<String>) -> Result<&'a str, String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing {column}")),
    }
}

fn parse_number(column: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("{column} is not a number: {raw:?}"))
}

fn optional_number(column: &str, value: &Option<String>) -> Result<f64, String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => parse_number(column, v),
        _ => Ok(0.0),
    }
}

/// Attach `today` to a bare `HH:MM:SS[.fff]` time; pass anything else through.
///
/// Undated rows are always read as "today", so the same file reports a
/// different date on every day the service runs.
pub fn normalize_timestamp(raw: &str, today: NaiveDate) -> String {
    // ---
    let raw = raw.trim();
    let is_bare_time = raw.matches(':').count() == 2 && !raw.contains(['T', '-', '/']);
    if is_bare_time {
        format!("{today}T{raw}Z")
    } else {
        raw.to_string()
    }
}

fn serialize_sensor_id<S: Serializer>(id: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("sensor_{id}"))
}

/// One processed reading served by `/api/sensor-data`.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    // ---
    /// Position in the rebuild, 1-based; rendered as `sensor_<n>`.
    #[serde(serialize_with = "serialize_sensor_id")]
    pub id: u64,
    pub timestamp: String,
    pub sensor_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pothole_count: u32,
    pub rqi: f64,
    pub road_name: String,
    pub municipality: String,
    pub severity: Severity,
    pub repair_status: &'static str,
}

impl SensorReading {
    /// Calendar date prefix of the timestamp (first 10 characters).
    pub fn date_key(&self) -> String {
        self.timestamp.chars().take(10).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    // ---
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub latitude: f64,
    pub longitude: f64,
    pub municipality: String,
    pub timestamp: String,
    pub status: &'static str,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    // ---
    pub date: String,
    pub potholes_detected: u64,
    /// Placeholder figure: potholes beyond the first five count as repaired.
    pub repairs_completed: u64,
    pub average_rqi: f64,
    pub active_alerts: u64,
    pub sensors_active: u64,
    pub road_coverage_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityStats {
    // ---
    pub name: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub total_sensors: u64,
    pub active_alerts: u64,
    pub total_potholes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    // ---
    pub total_sensors: u64,
    pub active_alerts: u64,
    pub total_potholes: u64,
    pub average_rqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePotholes {
    pub date: String,
    pub potholes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotholeSummary {
    pub total_potholes: u64,
    pub by_date: Vec<DatePotholes>,
}

/// `{data, count}` envelope used by every list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        let count = data.len();
        ListResponse { data, count }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn row(time: &str, lat: &str, pothole: &str) -> CsvRow {
        // ---
        CsvRow {
            time: Some(time.to_string()),
            sensor_type: Some("Gyro".to_string()),
            value1: Some("0.0".to_string()),
            value2: Some("0.0".to_string()),
            value3: Some("0.0".to_string()),
            latitude: Some(lat.to_string()),
            longitude: Some("76.75".to_string()),
            pothole: Some(pothole.to_string()),
        }
    }

    #[test]
    fn test_bare_time_gets_today() {
        // ---
        assert_eq!(
            normalize_timestamp("14:54:15.260", today()),
            "2024-06-01T14:54:15.260Z"
        );
        assert_eq!(normalize_timestamp("08:00:00", today()), "2024-06-01T08:00:00Z");
    }

    #[test]
    fn test_dated_timestamps_pass_through() {
        // ---
        let iso = "2024-05-20T10:11:12Z";
        assert_eq!(normalize_timestamp(iso, today()), iso);
        assert_eq!(normalize_timestamp("2024-05-20 10:11:12", today()), "2024-05-20 10:11:12");
        assert_eq!(normalize_timestamp("10:11", today()), "10:11");
    }

    #[test]
    fn test_normalize_example_row() {
        // ---
        let normalized = row("14:54:15.260", "30.70", "2").normalize(today()).unwrap();
        assert_eq!(normalized.timestamp, "2024-06-01T14:54:15.260Z");
        assert_eq!(normalized.sensor_type, "Gyro");
        assert_eq!(normalized.latitude, 30.70);
        assert_eq!(normalized.longitude, 76.75);
        assert_eq!(normalized.pothole_count, 2);
        assert_eq!(normalized.values, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pothole_is_truncated() {
        // ---
        let normalized = row("10:00:00", "30.7", "3.9").normalize(today()).unwrap();
        assert_eq!(normalized.pothole_count, 3);
    }

    #[test]
    fn test_empty_text_cells_pass_through() {
        // ---
        let mut r = row("", "30.7", "1");
        r.sensor_type = Some(String::new());
        let normalized = r.normalize(today()).unwrap();
        assert_eq!(normalized.timestamp, "");
        assert_eq!(normalized.sensor_type, "");
    }

    #[test]
    fn test_largest_pothole_count_kept_exact() {
        // ---
        let normalized = row("10:00:00", "30.7", "4294967295.5").normalize(today()).unwrap();
        assert_eq!(normalized.pothole_count, u32::MAX);
    }

    #[test]
    fn test_missing_values_default_to_zero() {
        // ---
        let mut r = row("10:00:00", "30.7", "0");
        r.value2 = None;
        r.value3 = Some(String::new());
        let normalized = r.normalize(today()).unwrap();
        assert_eq!(normalized.values, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_malformed_rows_rejected() {
        // ---
        let err = row("10:00:00", "north", "0").normalize(today()).unwrap_err();
        assert!(err.contains("Latitude"), "{err}");

        let mut missing_type = row("10:00:00", "30.7", "0");
        missing_type.sensor_type = None;
        assert_eq!(
            missing_type.normalize(today()).unwrap_err(),
            "missing SensorType column"
        );

        let mut missing_time = row("10:00:00", "30.7", "0");
        missing_time.time = None;
        assert_eq!(missing_time.normalize(today()).unwrap_err(), "missing Time column");

        let mut missing_lng = row("10:00:00", "30.7", "0");
        missing_lng.longitude = None;
        assert_eq!(missing_lng.normalize(today()).unwrap_err(), "missing Longitude");

        assert!(row("10:00:00", "30.7", "many").normalize(today()).is_err());
        assert!(row("10:00:00", "30.7", "-1").normalize(today()).is_err());
        assert!(row("10:00:00", "30.7", "5e9").normalize(today()).is_err());

        let mut bad_value = row("10:00:00", "30.7", "0");
        bad_value.value1 = Some("x".to_string());
        assert!(bad_value.normalize(today()).is_err());
    }

    #[test]
    fn test_reading_serializes_prefixed_id() {
        // ---
        let reading = SensorReading {
            id: 7,
            timestamp: "2024-06-01T14:54:15.260Z".into(),
            sensor_type: "Gyro".into(),
            latitude: 30.7,
            longitude: 76.75,
            pothole_count: 2,
            rqi: 9.5,
            road_name: "Road 7".into(),
            municipality: MOHALI_MC.into(),
            severity: Severity::Low,
            repair_status: "detected",
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["id"], "sensor_7");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["repair_status"], "detected");
        assert_eq!(reading.date_key(), "2024-06-01");
    }

    #[test]
    fn test_list_response_counts() {
        // ---
        let resp = ListResponse::from(vec![1, 2, 3]);
        assert_eq!(resp.count, 3);
        assert_eq!(serde_json::to_value(&resp).unwrap()["count"], 3);
    }
}
