//! Configuration loader for the `roadwatch-rqi` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, path::PathBuf, time::Duration};

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional boolean toggle. Only `true` (any case) enables it.
macro_rules! parse_env_flag {
    ($var_name:expr) => {
        env::var($var_name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// TCP port the HTTP server binds on `0.0.0.0`.
    pub port: u16,

    /// Directory holding uploaded `sensor_data_*.csv` files.
    pub csv_dir: PathBuf,

    /// Directory holding uploaded video files.
    pub video_dir: PathBuf,

    /// Accepted video file extensions, lowercase and without the dot.
    pub video_extensions: Vec<String>,

    /// Maximum accepted request body for uploads, in bytes.
    pub max_upload_bytes: usize,

    /// Whether road/municipality names come from the reverse geocoder.
    pub enable_geocoding: bool,

    /// Base URL of the Nominatim-compatible reverse geocoding service.
    pub geocoder_url: String,

    /// Per-call timeout for the reverse geocoder.
    pub geocode_timeout: Duration,

    /// Distinct locations geocoded per rebuild before falling back to defaults.
    pub geocode_max_locations: usize,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `PORT` – listen port (default: 8000)
/// - `CSV_UPLOAD_DIR` – CSV upload directory (default: `uploads/csv`)
/// - `VIDEO_UPLOAD_DIR` – video upload directory (default: `uploads/video`)
/// - `VIDEO_EXTENSIONS` – comma separated list (default: `mp4,avi,mov,mkv`)
/// - `MAX_UPLOAD_MB` – upload body limit in MiB (default: 512)
/// - `ENABLE_GEOCODING` – `true` to enable reverse geocoding (default: false)
/// - `GEOCODER_URL` – geocoder base URL (default: public Nominatim)
/// - `GEOCODE_TIMEOUT_SECS` – geocoder timeout (default: 5)
/// - `GEOCODE_MAX_LOCATIONS` – geocoded locations per rebuild (default: 20)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let port = parse_env_u32!("PORT", 8000);
    let port = u16::try_from(port).map_err(|_| anyhow!("Invalid PORT: {} is out of range", port))?;

    let csv_dir = PathBuf::from(env_or!("CSV_UPLOAD_DIR", "uploads/csv"));
    let video_dir = PathBuf::from(env_or!("VIDEO_UPLOAD_DIR", "uploads/video"));

    let video_extensions = match env::var("VIDEO_EXTENSIONS") {
        Ok(raw) => parse_extension_list(&raw)?,
        Err(_) => DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
    };

    let max_upload_mb = parse_env_u32!("MAX_UPLOAD_MB", 512);
    let enable_geocoding = parse_env_flag!("ENABLE_GEOCODING");
    let geocoder_url = env_or!("GEOCODER_URL", "https://nominatim.openstreetmap.org");
    let geocode_timeout_secs = parse_env_u32!("GEOCODE_TIMEOUT_SECS", 5);
    let geocode_max_locations = parse_env_u32!("GEOCODE_MAX_LOCATIONS", 20);

    Ok(Config {
        port,
        csv_dir,
        video_dir,
        video_extensions,
        max_upload_bytes: max_upload_mb as usize * 1024 * 1024,
        enable_geocoding,
        geocoder_url: geocoder_url.trim_end_matches('/').to_string(),
        geocode_timeout: Duration::from_secs(u64::from(geocode_timeout_secs)),
        geocode_max_locations: geocode_max_locations as usize,
    })
}

/// Split a comma separated extension list, normalizing case and leading dots.
fn parse_extension_list(raw: &str) -> Result<Vec<String>> {
    // ---
    let exts: Vec<String> = raw
        .split(',')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    if exts.is_empty() {
        return Err(anyhow!("Invalid VIDEO_EXTENSIONS: no extensions in {:?}", raw));
    }
    Ok(exts)
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  PORT                  : {}", self.port);
        tracing::info!("  CSV_UPLOAD_DIR        : {}", self.csv_dir.display());
        tracing::info!("  VIDEO_UPLOAD_DIR      : {}", self.video_dir.display());
        tracing::info!("  VIDEO_EXTENSIONS      : {}", self.video_extensions.join(","));
        tracing::info!("  MAX_UPLOAD_MB         : {}", self.max_upload_bytes / (1024 * 1024));
        tracing::info!("  ENABLE_GEOCODING      : {}", self.enable_geocoding);
        if self.enable_geocoding {
            tracing::info!("  GEOCODER_URL          : {}", self.geocoder_url);
            tracing::info!("  GEOCODE_TIMEOUT_SECS  : {}", self.geocode_timeout.as_secs());
            tracing::info!("  GEOCODE_MAX_LOCATIONS : {}", self.geocode_max_locations);
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_extension_list_normalized() {
        // ---
        let exts = parse_extension_list(" .MP4, mov ,,.Mkv").unwrap();
        assert_eq!(exts, vec!["mp4", "mov", "mkv"]);
    }

    #[test]
    fn test_empty_extension_list_rejected() {
        // ---
        assert!(parse_extension_list(" , ,").is_err());
    }
}
