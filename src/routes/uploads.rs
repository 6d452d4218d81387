//! Multipart upload endpoints for sensor CSVs and dashcam videos.
//!
//! Exports `POST /upload/csv` and `POST /upload/video`. Both expect a single
//! multipart field named `file`; storage rules live in `crate::upload`.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use super::AppState;
use crate::{
    error::{Error, Result},
    upload::{store_upload, UploadKind, UploadReceipt},
};

// ---

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    // ---
    Router::new()
        .route("/upload/csv", post(upload_csv))
        .route("/upload/video", post(upload_video))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Form extraction result; a missing or wrong content type is rendered as a
/// `BadUpload` instead of axum's plain-text rejection.
type MultipartForm = std::result::Result<Multipart, MultipartRejection>;

async fn upload_csv(
    State(state): State<AppState>,
    multipart: MultipartForm,
) -> Result<Json<UploadReceipt>> {
    // ---
    info!("POST /upload/csv");
    handle_upload(UploadKind::Csv, &state, multipart).await
}

async fn upload_video(
    State(state): State<AppState>,
    multipart: MultipartForm,
) -> Result<Json<UploadReceipt>> {
    // ---
    info!("POST /upload/video");
    handle_upload(UploadKind::Video, &state, multipart).await
}

async fn handle_upload(
    kind: UploadKind,
    state: &AppState,
    multipart: MultipartForm,
) -> Result<Json<UploadReceipt>> {
    // ---
    let mut multipart = multipart.map_err(|e| Error::BadUpload(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::BadUpload("Missing file name".to_string()))?;
        let data = field.bytes().await.map_err(multipart_error)?;

        let receipt = store_upload(kind, &filename, &data, &state.config).await?;
        return Ok(Json(receipt));
    }

    Err(Error::BadUpload("No file provided".to_string()))
}

/// Body-limit overruns keep their 413 status; anything else is a bad upload.
fn multipart_error(e: MultipartError) -> Error {
    // ---
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::UploadTooLarge(e.body_text())
    } else {
        Error::BadUpload(e.body_text())
    }
}
