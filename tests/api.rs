//! HTTP API integration tests.
//!
//! Drive the production router with stub engines injected through the OCR
//! service's factory seam. Multipart bodies are assembled by hand so the
//! tests pin the exact wire format clients send.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use novoyaz_server::app;
use novoyaz_server::ocr::{EngineFactory, OcrError, OcrService, RawEngineResult, Recognizer};
use novoyaz_server::raster::RasterImage;
use novoyaz_server::state::AppState;

/// Engine stub returning a canned raw result.
struct StubEngine {
    raw: RawEngineResult,
}

#[async_trait]
impl Recognizer for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn recognize(&self, _raster: &RasterImage) -> Result<RawEngineResult, OcrError> {
        Ok(self.raw.clone())
    }
}

/// Engine stub that always fails.
struct BrokenEngine;

#[async_trait]
impl Recognizer for BrokenEngine {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn recognize(&self, _raster: &RasterImage) -> Result<RawEngineResult, OcrError> {
        Err(OcrError::Engine("model weights corrupted".to_string()))
    }
}

fn server_with_factory(factory: EngineFactory) -> TestServer {
    let service = OcrService::with_engine_factory(Duration::from_secs(5), factory);
    TestServer::new(app(AppState::new(service))).unwrap()
}

fn server_with_raw(raw: Value) -> TestServer {
    server_with_factory(Box::new(move || {
        let raw = raw.clone();
        Box::pin(async move { Ok(Arc::new(StubEngine { raw }) as Arc<dyn Recognizer>) })
    }))
}

const BOUNDARY: &str = "novoyaz-test-boundary";

/// Assemble a multipart/form-data body from (field, filename, bytes) parts.
fn multipart_body(parts: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn png_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 200, 200]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

fn greeting_raw() -> Value {
    json!([[[[[0, 0], [1, 0], [1, 1], [0, 1]], ["привет", 0.95]]]])
}

#[tokio::test]
async fn ping_reports_service() {
    let server = server_with_raw(json!([]));

    for route in ["/ping", "/healthz"] {
        let response = server.get(route).await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["service"], json!("novoyaz-server"));
    }
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let server = server_with_raw(json!([]));

    let (content_type, body) = multipart_body(&[]);
    let response = server
        .post("/ocr")
        .content_type(&content_type)
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], json!("No files uploaded."));
}

#[tokio::test]
async fn corrupt_file_is_rejected_with_its_name() {
    let server = server_with_raw(json!([]));

    let (content_type, body) = multipart_body(&[("files", "bad.txt", b"not an image at all")]);
    let response = server
        .post("/ocr")
        .content_type(&content_type)
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("bad.txt"));
    assert_eq!(detail, "Unsupported file type for bad.txt. Use JPG/PNG.");
}

#[tokio::test]
async fn successful_upload_returns_lines() {
    let server = server_with_raw(greeting_raw());

    let png = png_bytes();
    let (content_type, body) = multipart_body(&[("files", "scan.png", &png)]);
    let response = server
        .post("/ocr")
        .content_type(&content_type)
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["lang"], json!("ru"));

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["kind"], json!("image"));
    assert_eq!(results[0]["input"], json!("scan.png"));
    assert_eq!(results[0]["text"], json!("привет"));

    let lines = results[0]["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["text"], json!("привет"));
    assert_eq!(lines[0]["confidence"], json!(0.95));
    assert_eq!(lines[0]["bbox"], json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]));
}

#[tokio::test]
async fn mixed_batch_isolates_the_bad_file() {
    let server = server_with_raw(greeting_raw());

    let png = png_bytes();
    let (content_type, body) = multipart_body(&[
        ("files", "bad.txt", b"garbage".as_slice()),
        ("files", "good.png", &png),
    ]);
    let response = server
        .post("/ocr")
        .content_type(&content_type)
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["kind"], json!("error"));
    assert_eq!(results[0]["input"], json!("bad.txt"));
    assert!(results[0]["detail"].as_str().unwrap().contains("bad.txt"));

    assert_eq!(results[1]["kind"], json!("image"));
    assert_eq!(results[1]["input"], json!("good.png"));
    assert_eq!(results[1]["text"], json!("привет"));
}

#[tokio::test]
async fn engine_failure_leaks_no_detail() {
    let server = server_with_factory(Box::new(|| {
        Box::pin(async { Ok(Arc::new(BrokenEngine) as Arc<dyn Recognizer>) })
    }));

    let png = png_bytes();
    let (content_type, body) = multipart_body(&[("files", "scan.png", &png)]);
    let response = server
        .post("/ocr")
        .content_type(&content_type)
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    let detail = body["detail"].as_str().unwrap();
    assert_eq!(detail, "OCR engine failure.");
    assert!(!detail.contains("weights"));
}

#[tokio::test]
async fn unreachable_engine_yields_service_unavailable() {
    let server = server_with_factory(Box::new(|| {
        Box::pin(async {
            Err(OcrError::EngineInit(
                "engine at http://localhost:1 unreachable".to_string(),
            ))
        })
    }));

    let png = png_bytes();
    let (content_type, body) = multipart_body(&[("files", "scan.png", &png)]);
    let response = server
        .post("/ocr")
        .content_type(&content_type)
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn non_file_fields_are_ignored() {
    let server = server_with_raw(json!([]));

    // One plain form value, no file parts: still an empty batch.
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let response = server
        .post("/ocr")
        .content_type(&format!("multipart/form-data; boundary={BOUNDARY}"))
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], json!("No files uploaded."));
}
