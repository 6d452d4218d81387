//! Error taxonomy for the request pipeline.
//!
//! Every failure that reaches an HTTP handler is one of these variants and is
//! rendered as `{"detail": "<message>"}` with a status derived from the
//! variant. Geocoding failures are not listed here: they are recovered inside
//! the location resolver and never reach a handler.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum Error {
    // ---
    /// A CSV row could not be normalized; aborts the whole rebuild.
    #[error("Malformed record in {file} line {line}: {reason}")]
    MalformedRecord {
        file: String,
        line: u64,
        reason: String,
    },

    /// No `sensor_data_*.csv` file exists in the upload directory.
    #[error("No sensor data files found")]
    NoDataFound,

    /// Upload rejected before touching the disk.
    #[error("{0}")]
    BadUpload(String),

    /// Upload body exceeded the configured size limit.
    #[error("{0}")]
    UploadTooLarge(String),

    /// Reading or writing a file failed.
    #[error("Storage failure on {}: {source}", .path.display())]
    StorageFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    // ---
    pub fn malformed(file: impl Into<String>, line: u64, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::StorageFailure {
            path: path.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoDataFound => StatusCode::NOT_FOUND,
            Error::BadUpload(_) => StatusCode::BAD_REQUEST,
            Error::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::MalformedRecord { .. } | Error::StorageFailure { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error body, same shape the dashboard frontend already parses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
