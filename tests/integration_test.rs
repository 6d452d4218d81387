//! Live-server checks. Start the service with at least one
//! `sensor_data_*.csv` upload, then run `cargo test -- --ignored`
//! (optionally with `BASE_URL`).

use anyhow::Result;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SensorReading {
    id: String,
    timestamp: String,
    rqi: f64,
    severity: String,
    pothole_count: u32,
    municipality: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct DailyTrend {
    date: String,
    potholes_detected: u64,
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn sensor_data_derivations_hold() -> Result<()> {
    // ---
    let url = format!("{}/api/sensor-data", base_url());
    let body: ListResponse<SensorReading> = Client::new().get(&url).send().await?.json().await?;

    assert_eq!(body.count, body.data.len());
    assert!(!body.data.is_empty(), "No readings returned from {}", url);

    for (i, r) in body.data.iter().enumerate() {
        // ---
        // 1) Contiguous ids in rebuild order
        assert_eq!(r.id, format!("sensor_{}", i + 1));

        // 2) RQI is one of the five buckets
        assert!(
            [9.5, 8.5, 7.0, 5.5, 3.0].contains(&r.rqi),
            "Unexpected RQI {} on {}",
            r.rqi,
            r.id
        );

        // 3) Severity follows RQI
        let expected = if r.rqi < 5.0 {
            "high"
        } else if r.rqi < 7.0 {
            "medium"
        } else {
            "low"
        };
        assert_eq!(r.severity, expected, "Severity wrong for {}", r.id);

        assert!(!r.timestamp.is_empty());
        assert!(!r.municipality.is_empty());
    }

    // 4) Daily trends account for every pothole
    let trends_url = format!("{}/api/trends", base_url());
    let trends: ListResponse<DailyTrend> =
        Client::new().get(&trends_url).send().await?.json().await?;
    let from_trends: u64 = trends.data.iter().map(|t| t.potholes_detected).sum();
    let from_readings: u64 = body.data.iter().map(|r| u64::from(r.pothole_count)).sum();
    assert_eq!(from_trends, from_readings);
    assert!(trends.data.windows(2).all(|w| w[0].date < w[1].date));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn upload_rejects_wrong_extension() -> Result<()> {
    // ---
    let url = format!("{}/upload/csv", base_url());
    let part = multipart::Part::bytes(b"not a csv".to_vec()).file_name("notes.txt");
    let form = multipart::Form::new().part("file", part);

    let response = Client::new().post(&url).multipart(form).send().await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
