//! Recognition engines.
//!
//! The actual OCR engine is an external black box. The service reaches it
//! through the `Recognizer` capability trait so the heavy engine can be
//! constructed once behind the service and swapped for a mock in tests.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::types::{OcrError, RawEngineResult, OCR_LANG};
use crate::config::EngineConfig;
use crate::raster::RasterImage;

/// Capability interface over the external OCR engine.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Engine name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Run recognition on one raster, returning the engine's raw,
    /// version-dependent result structure unmodified.
    async fn recognize(&self, raster: &RasterImage) -> Result<RawEngineResult, OcrError>;
}

/// PaddleOCR sidecar reached over HTTP.
///
/// The sidecar owns the detection, recognition, and angle-classification
/// models; this handle owns the connection and the fixed recognition
/// configuration (Cyrillic models, angle classification on).
pub struct RemotePaddleEngine {
    client: reqwest::Client,
    endpoint: String,
    det_box_thresh: f32,
    use_gpu: bool,
}

impl RemotePaddleEngine {
    /// Connect to the sidecar and verify it is reachable.
    ///
    /// Probing here makes a misconfigured deployment (wrong endpoint,
    /// sidecar not running, models missing) fail on construction with a
    /// diagnosable error instead of garbling the first upload.
    pub async fn connect(config: &EngineConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::EngineInit(e.to_string()))?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let health_url = format!("{endpoint}/health");
        let response = client.get(&health_url).send().await.map_err(|e| {
            OcrError::EngineInit(format!("engine at {endpoint} unreachable: {e}"))
        })?;
        if !response.status().is_success() {
            return Err(OcrError::EngineInit(format!(
                "engine at {endpoint} returned {}",
                response.status()
            )));
        }

        tracing::info!(endpoint = %endpoint, "OCR engine connected");

        Ok(Self {
            client,
            endpoint,
            det_box_thresh: config.det_box_thresh,
            use_gpu: config.use_gpu,
        })
    }
}

#[async_trait]
impl Recognizer for RemotePaddleEngine {
    fn name(&self) -> &'static str {
        "paddle-remote"
    }

    async fn recognize(&self, raster: &RasterImage) -> Result<RawEngineResult, OcrError> {
        let png = raster
            .encode_png()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let request = serde_json::json!({
            "images": [BASE64.encode(png)],
            "lang": OCR_LANG,
            "use_angle_cls": true,
            "det_db_box_thresh": self.det_box_thresh,
            "use_gpu": self.use_gpu,
        });

        let url = format!("{}/predict/ocr_system", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::Engine(format!("engine call failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Engine(format!("engine returned {status}: {body}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::Engine(format!("unparseable engine reply: {e}")))?;

        // The reply envelope carries the detections under "results"; older
        // sidecars return the bare result array. Either way the raw value
        // goes to the normalizer untouched.
        Ok(body.get("results").cloned().unwrap_or(body))
    }
}

/// Mock engine for tests.
#[cfg(test)]
pub struct MockRecognizer {
    pub raw: RawEngineResult,
}

#[cfg(test)]
#[async_trait]
impl Recognizer for MockRecognizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recognize(&self, _raster: &RasterImage) -> Result<RawEngineResult, OcrError> {
        Ok(self.raw.clone())
    }
}
