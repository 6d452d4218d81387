//! Upload validation and storage.
//!
//! Files are accepted on extension alone and written whole to the directory
//! of their kind. A failed write may leave a partial file behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::{
    error::{Error, Result},
    Config,
};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Csv,
    Video,
}

impl UploadKind {
    // ---
    pub fn directory(self, config: &Config) -> &Path {
        match self {
            UploadKind::Csv => &config.csv_dir,
            UploadKind::Video => &config.video_dir,
        }
    }

    fn accepts(self, extension: &str, config: &Config) -> bool {
        match self {
            UploadKind::Csv => extension == "csv",
            UploadKind::Video => config.video_extensions.iter().any(|e| e == extension),
        }
    }

    fn rejection(self) -> &'static str {
        match self {
            UploadKind::Csv => "Only CSV files are allowed",
            UploadKind::Video => "Only video files are allowed",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            UploadKind::Csv => "File uploaded successfully",
            UploadKind::Video => "Video uploaded successfully",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub message: &'static str,
    pub filename: String,
    pub size: usize,
}

/// Check the client supplied name and return the bare file name to store.
///
/// Directory components are stripped so a name cannot escape the upload
/// directory.
pub fn validate_filename(kind: UploadKind, raw_name: &str, config: &Config) -> Result<String> {
    // ---
    let name = Path::new(raw_name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::BadUpload("Missing file name".to_string()))?;

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !kind.accepts(&extension, config) {
        return Err(Error::BadUpload(kind.rejection().to_string()));
    }
    Ok(name.to_string())
}

/// Validate and write an uploaded file to the directory of its kind.
pub async fn store_upload(
    kind: UploadKind,
    raw_name: &str,
    contents: &[u8],
    config: &Config,
) -> Result<UploadReceipt> {
    // ---
    let filename = validate_filename(kind, raw_name, config)?;
    let path: PathBuf = kind.directory(config).join(&filename);

    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| Error::storage(&path, e))?;

    info!("Stored upload {} ({} bytes)", path.display(), contents.len());
    Ok(UploadReceipt {
        message: kind.success_message(),
        filename,
        size: contents.len(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    // ---
    use super::*;
    use crate::config::DEFAULT_VIDEO_EXTENSIONS;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Config rooted in a temporary directory with both upload dirs created.
    pub(crate) fn test_config(root: &Path) -> Config {
        // ---
        let csv_dir = root.join("csv");
        let video_dir = root.join("video");
        std::fs::create_dir_all(&csv_dir).unwrap();
        std::fs::create_dir_all(&video_dir).unwrap();

        Config {
            port: 0,
            csv_dir,
            video_dir,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_upload_bytes: 1024 * 1024,
            enable_geocoding: false,
            geocoder_url: "http://127.0.0.1:9".to_string(),
            geocode_timeout: Duration::from_secs(1),
            geocode_max_locations: 20,
        }
    }

    #[test]
    fn test_extension_rules() {
        // ---
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());

        assert_eq!(
            validate_filename(UploadKind::Csv, "track.csv", &config).unwrap(),
            "track.csv"
        );
        assert!(validate_filename(UploadKind::Csv, "TRACK.CSV", &config).is_ok());
        assert!(matches!(
            validate_filename(UploadKind::Csv, "track.txt", &config),
            Err(Error::BadUpload(_))
        ));
        assert!(validate_filename(UploadKind::Csv, "csv", &config).is_err());

        for ok in ["ride.mp4", "ride.avi", "ride.mov", "ride.mkv"] {
            assert!(validate_filename(UploadKind::Video, ok, &config).is_ok(), "{ok}");
        }
        assert!(validate_filename(UploadKind::Video, "ride.csv", &config).is_err());
    }

    #[test]
    fn test_directory_components_stripped() {
        // ---
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());

        assert_eq!(
            validate_filename(UploadKind::Csv, "../../etc/sensor_data_1.csv", &config).unwrap(),
            "sensor_data_1.csv"
        );
        assert!(validate_filename(UploadKind::Csv, "..", &config).is_err());
        assert!(validate_filename(UploadKind::Csv, "", &config).is_err());
    }

    #[tokio::test]
    async fn test_store_upload_writes_file() {
        // ---
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());

        let receipt =
            tokio_test::assert_ok!(store_upload(UploadKind::Csv, "track.csv", b"Time\n", &config).await);
        assert_eq!(receipt.filename, "track.csv");
        assert_eq!(receipt.size, 5);
        assert_eq!(receipt.message, "File uploaded successfully");
        assert_eq!(std::fs::read(config.csv_dir.join("track.csv")).unwrap(), b"Time\n");
    }

    #[tokio::test]
    async fn test_rejected_upload_not_stored() {
        // ---
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());

        let result = store_upload(UploadKind::Csv, "track.txt", b"hello", &config).await;
        assert!(matches!(result, Err(Error::BadUpload(_))));
        assert!(!config.csv_dir.join("track.txt").exists());
    }

    #[tokio::test]
    async fn test_write_failure_is_storage_error() {
        // ---
        let root = TempDir::new().unwrap();
        let mut config = test_config(root.path());
        config.video_dir = root.path().join("missing");

        let result = store_upload(UploadKind::Video, "ride.mp4", b"\0\0", &config).await;
        assert!(matches!(result, Err(Error::StorageFailure { .. })));
    }
}
