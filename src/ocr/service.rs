//! OCR service.
//!
//! Owns the engine lifecycle: at-most-once construction of the shared
//! `Recognizer`, the per-call latency bound, and the normalization that
//! turns a raw engine reply into a `RecognizedPage`.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use super::engine::{Recognizer, RemotePaddleEngine};
use super::normalize::normalize_result;
use super::types::{OcrError, RecognizedPage};
use crate::config::EngineConfig;
use crate::raster::RasterImage;

/// Builds the engine on first use. Injectable so tests can count
/// constructions and substitute mocks.
pub type EngineFactory =
    Box<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn Recognizer>, OcrError>> + Send + Sync>;

/// OCR service shared by all requests.
pub struct OcrService {
    engine: OnceCell<Arc<dyn Recognizer>>,
    factory: EngineFactory,
    timeout: Duration,
}

impl OcrService {
    /// Service backed by the PaddleOCR sidecar described in `config`.
    pub fn new(config: &EngineConfig) -> Self {
        let engine_config = config.clone();
        Self::with_engine_factory(
            Duration::from_secs(config.timeout_secs),
            Box::new(move || {
                let config = engine_config.clone();
                Box::pin(async move {
                    let engine = RemotePaddleEngine::connect(&config).await?;
                    Ok(Arc::new(engine) as Arc<dyn Recognizer>)
                })
            }),
        )
    }

    /// Service with an injected engine factory.
    pub fn with_engine_factory(timeout: Duration, factory: EngineFactory) -> Self {
        Self {
            engine: OnceCell::new(),
            factory,
            timeout,
        }
    }

    /// Construct the engine now instead of on the first request.
    pub async fn warm_up(&self) -> Result<(), OcrError> {
        self.engine().await.map(|_| ())
    }

    /// The shared engine handle, built at most once.
    ///
    /// Concurrent first callers race into `get_or_try_init`, which runs the
    /// factory exactly once; a failed construction leaves the cell empty so
    /// the next request retries.
    async fn engine(&self) -> Result<&Arc<dyn Recognizer>, OcrError> {
        self.engine
            .get_or_try_init(|| async {
                tracing::info!("constructing OCR engine");
                let engine = (self.factory)().await.map_err(|e| {
                    tracing::error!("OCR engine construction failed: {e}");
                    e
                })?;
                tracing::info!(engine = engine.name(), "OCR engine ready");
                Ok(engine)
            })
            .await
    }

    /// Recognize one raster and normalize the engine's raw reply.
    pub async fn recognize_page(&self, raster: &RasterImage) -> Result<RecognizedPage, OcrError> {
        let engine = self.engine().await?;

        let raw = tokio::time::timeout(self.timeout, engine.recognize(raster))
            .await
            .map_err(|_| OcrError::Timeout(self.timeout.as_secs()))??;

        Ok(normalize_result(&raw))
    }
}
