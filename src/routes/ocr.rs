//! OCR endpoint
//!
//! `POST /ocr` accepts one or more image files as multipart form parts and
//! returns per-file recognition outcomes. Failures are isolated per file: a
//! bad upload produces an error outcome for that file only, and later files
//! in the batch still run. Only when every file fails does the response
//! collapse to the first failure's status.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::ocr::{RecognizedLine, OCR_LANG};
use crate::raster::{RasterError, RasterImage};
use crate::state::AppState;

/// Allow up to 50MB of uploaded scans per request.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// One uploaded file part, alive for the duration of the request.
struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Batch response.
#[derive(Serialize)]
pub struct OcrResponse {
    pub results: Vec<FileOutcome>,
    pub lang: &'static str,
}

/// Per-file outcome: a recognized page or an isolated failure.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileOutcome {
    Image {
        input: String,
        text: String,
        lines: Vec<RecognizedLine>,
    },
    Error {
        input: String,
        detail: String,
    },
}

/// Batch-level error body.
#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

/// Create the OCR router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(recognize_batch))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// POST /ocr
async fn recognize_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, (StatusCode, Json<ErrorDetail>)> {
    let files = collect_files(&mut multipart).await?;

    if files.is_empty() {
        return Err(error_detail(
            StatusCode::BAD_REQUEST,
            "No files uploaded.".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(files.len());
    let mut first_failure: Option<(StatusCode, String)> = None;
    let mut any_success = false;

    for file in files {
        match process_file(&state, &file).await {
            Ok(outcome) => {
                any_success = true;
                results.push(outcome);
            }
            Err((status, detail)) => {
                if first_failure.is_none() {
                    first_failure = Some((status, detail.clone()));
                }
                results.push(FileOutcome::Error {
                    input: file.filename,
                    detail,
                });
            }
        }
    }

    if !any_success {
        let (status, detail) = first_failure.expect("non-empty batch produced no outcomes");
        return Err(error_detail(status, detail));
    }

    Ok(Json(OcrResponse {
        results,
        lang: OCR_LANG,
    }))
}

/// Run one file through decode, recognition, and normalization.
async fn process_file(
    state: &AppState,
    file: &UploadedFile,
) -> Result<FileOutcome, (StatusCode, String)> {
    tracing::debug!(
        filename = %file.filename,
        content_type = ?file.content_type,
        size = file.bytes.len(),
        "processing uploaded file"
    );

    let raster = RasterImage::from_bytes(&file.bytes).map_err(|e| {
        tracing::warn!(filename = %file.filename, "image decode failed: {e}");
        match e {
            RasterError::UnsupportedFormat(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Unsupported file type for {}. Use JPG/PNG.", file.filename),
            ),
            RasterError::Encode(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image processing failure.".to_string(),
            ),
        }
    })?;

    let page = state.ocr().recognize_page(&raster).await.map_err(|e| {
        // Engine failures are server-side; the response carries no internal
        // detail, the log carries all of it.
        tracing::error!(filename = %file.filename, "recognition failed: {e}");
        (e.status_code(), "OCR engine failure.".to_string())
    })?;

    tracing::debug!(
        filename = %file.filename,
        lines = page.lines.len(),
        "file recognized"
    );

    Ok(FileOutcome::Image {
        input: file.filename.clone(),
        text: page.text(),
        lines: page.lines,
    })
}

/// Pull every file part out of the multipart body, in submitted order.
async fn collect_files(
    multipart: &mut Multipart,
) -> Result<Vec<UploadedFile>, (StatusCode, Json<ErrorDetail>)> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("failed to read multipart field: {e}");
        error_detail(StatusCode::BAD_REQUEST, "Failed to read upload.".to_string())
    })? {
        // A part without a filename is not a file upload; skip form values.
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string());

        let bytes = field.bytes().await.map_err(|e| {
            tracing::error!(filename = %filename, "failed to read file data: {e}");
            error_detail(
                StatusCode::BAD_REQUEST,
                format!("Failed to read file data for {filename}."),
            )
        })?;

        files.push(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Ok(files)
}

fn error_detail(status: StatusCode, detail: String) -> (StatusCode, Json<ErrorDetail>) {
    (status, Json(ErrorDetail { detail }))
}
