//! Application state management

use std::sync::Arc;

use crate::ocr::OcrService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    ocr: OcrService,
}

impl AppState {
    /// Create a new application state around the OCR service.
    ///
    /// The service holds the only cross-request shared resource (the engine
    /// handle); everything else is per-request.
    pub fn new(ocr: OcrService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { ocr }),
        }
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}
