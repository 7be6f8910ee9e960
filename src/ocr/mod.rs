//! OCR Module
//!
//! Recognition of Cyrillic text on uploaded images. The heavy lifting is
//! delegated to an external engine; this module owns the engine lifecycle,
//! the tolerant normalization of its version-dependent raw output, and the
//! domain types the HTTP layer serializes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use novoyaz_server::ocr::OcrService;
//! use novoyaz_server::raster::RasterImage;
//!
//! let service = OcrService::new(&config.engine);
//! let raster = RasterImage::from_bytes(&upload_bytes)?;
//! let page = service.recognize_page(&raster).await?;
//! println!("{}", page.text());
//! ```

mod engine;
mod normalize;
mod service;
mod types;

pub use engine::{Recognizer, RemotePaddleEngine};
pub use normalize::{coerce_float, normalize_result};
pub use service::{EngineFactory, OcrService};
pub use types::{OcrError, RawEngineResult, RecognizedLine, RecognizedPage, OCR_LANG};
