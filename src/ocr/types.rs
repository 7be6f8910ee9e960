//! OCR domain types.

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Language the recognition models are loaded for. Not user-configurable.
pub const OCR_LANG: &str = "ru";

/// Raw, version-dependent result structure returned by the engine:
/// a sequence of pages, each a sequence of detections.
pub type RawEngineResult = serde_json::Value;

/// A single recognized text line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedLine {
    /// Recognized text, never whitespace-only.
    pub text: String,
    /// Engine score in [0, 1]; 0.0 when the engine omitted or mangled it.
    pub confidence: f64,
    /// Detection polygon, typically 4 points.
    pub bbox: Vec<[f64; 2]>,
}

/// All lines recognized on one image, in engine detection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognizedPage {
    pub lines: Vec<RecognizedLine>,
}

impl RecognizedPage {
    /// Newline-joined view over the line texts. Derived, never stored.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Recognition engine error types
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("engine initialization failed: {0}")]
    EngineInit(String),

    #[error("engine call failed: {0}")]
    Engine(String),

    #[error("recognition timed out after {0}s")]
    Timeout(u64),
}

impl OcrError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EngineInit(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}
