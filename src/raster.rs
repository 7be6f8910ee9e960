//! Raster decoding and normalization.
//!
//! Uploaded bytes become an upright 3-channel RGB raster before recognition.
//! The engine never sees container formats, alpha channels, palettes, or
//! sideways phone photos.

use std::io::Cursor;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use thiserror::Error;

/// Raster error types
#[derive(Debug, Error)]
pub enum RasterError {
    /// The bytes are not a decodable image container.
    #[error("unsupported or corrupt image data: {0}")]
    UnsupportedFormat(String),

    /// Re-encoding the raster for engine transport failed.
    #[error("failed to encode raster: {0}")]
    Encode(String),
}

/// Decoded pixel buffer in RGB order with orientation already applied.
pub struct RasterImage {
    image: RgbImage,
}

impl RasterImage {
    /// Decode arbitrary uploaded bytes into an upright RGB raster.
    ///
    /// Applies the orientation embedded in the container metadata, then
    /// flattens grayscale/RGBA/palette sources down to 3-channel RGB.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RasterError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| RasterError::UnsupportedFormat(e.to_string()))?;
        let mut decoder = reader
            .into_decoder()
            .map_err(|e| RasterError::UnsupportedFormat(e.to_string()))?;
        // Decoders without orientation metadata report NoTransforms; a
        // metadata read failure must not fail the decode.
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image = DynamicImage::from_decoder(decoder)
            .map_err(|e| RasterError::UnsupportedFormat(e.to_string()))?;
        image.apply_orientation(orientation);

        Ok(Self {
            image: image.to_rgb8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Re-encode as PNG for engine transport. Lossless.
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
impl RasterImage {
    /// Build a raster directly from pixels.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }
}
