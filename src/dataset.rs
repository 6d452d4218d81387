//! Sensor dataset rebuild.
//!
//! `build_dataset` is the single entry point every read endpoint goes
//! through: it discovers the uploaded `sensor_data_*.csv` files, orders them
//! by modification time and turns every row into a `SensorReading`. Nothing
//! is cached between calls apart from what the caller chooses to keep.

use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    location::{LocationCache, LocationResolver},
    models::{CsvRow, SensorReading},
    rqi::{estimate_rqi, Severity},
};

// ---

const FILE_PREFIX: &str = "sensor_data_";
const FILE_SUFFIX: &str = ".csv";

/// Whether a file name matches `sensor_data_*.csv`.
pub fn is_sensor_file(name: &str) -> bool {
    name.len() >= FILE_PREFIX.len() + FILE_SUFFIX.len()
        && name.starts_with(FILE_PREFIX)
        && name.ends_with(FILE_SUFFIX)
}

/// List sensor files in upload order: oldest modification time first, with
/// the path as tie breaker.
pub async fn discover_sensor_files(csv_dir: &Path) -> Result<Vec<PathBuf>> {
    // ---
    let mut entries = match tokio::fs::read_dir(csv_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::NoDataFound),
        Err(e) => return Err(Error::storage(csv_dir, e)),
    };

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::storage(csv_dir, e))?
    {
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_sensor_file) {
            continue;
        }

        let path = entry.path();
        let meta = entry.metadata().await.map_err(|e| Error::storage(&path, e))?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().map_err(|e| Error::storage(&path, e))?;
        files.push((modified, path));
    }

    if files.is_empty() {
        return Err(Error::NoDataFound);
    }

    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Rebuild the full ordered list of readings from disk.
///
/// `today` is the date attached to rows whose timestamp carries no date.
/// The first malformed row aborts the whole rebuild.
pub async fn build_dataset(
    csv_dir: &Path,
    resolver: &dyn LocationResolver,
    today: NaiveDate,
) -> Result<Vec<SensorReading>> {
    // ---
    let files = discover_sensor_files(csv_dir).await?;

    let mut readings = Vec::new();
    let mut cache = LocationCache::default();
    let mut counter: u64 = 1;

    for path in &files {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::storage(path, e))?;
        let file_label = display_name(path);
        debug!("Reading {} ({} bytes)", file_label, bytes.len());

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| Error::malformed(&file_label, 1, e.to_string()))?
            .clone();

        let mut record = StringRecord::new();
        loop {
            let has_row = reader.read_record(&mut record).map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                Error::malformed(&file_label, line, e.to_string())
            })?;
            if !has_row {
                break;
            }

            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: CsvRow = record
                .deserialize(Some(&headers))
                .map_err(|e| Error::malformed(&file_label, line, e.to_string()))?;
            let normalized = row
                .normalize(today)
                .map_err(|reason| Error::malformed(&file_label, line, reason))?;

            let [v1, v2, v3] = normalized.values;
            let rqi = estimate_rqi(v1, v2, v3);
            let location = resolver
                .resolve(normalized.latitude, normalized.longitude, counter, &mut cache)
                .await;

            readings.push(SensorReading {
                id: counter,
                timestamp: normalized.timestamp,
                sensor_type: normalized.sensor_type,
                latitude: normalized.latitude,
                longitude: normalized.longitude,
                pothole_count: normalized.pothole_count,
                rqi,
                road_name: location.road_name,
                municipality: location.municipality,
                severity: Severity::from_rqi(rqi),
                repair_status: "detected",
            });
            counter += 1;
        }
    }

    info!(
        records = readings.len(),
        files = files.len(),
        geocoded_locations = cache.len(),
        "Rebuilt sensor dataset"
    );
    Ok(readings)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
