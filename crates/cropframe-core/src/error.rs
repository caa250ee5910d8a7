//! Error types shared across the crate.
//!
//! Geometry never fails: invalid rectangles are clamped and reported through
//! [`Commit`](crate::controller::Commit). Only decoding, encoding,
//! rasterization and session sequencing have error paths.

use thiserror::Error;

/// Errors from decoding source image bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Raw pixel data does not match the stated dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// Errors from encoding the cropped buffer.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The MIME type names a format we cannot write.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Fatal rasterization failures.
#[derive(Debug, Error)]
pub enum RasterizeError {
    /// The source image has no pixels.
    #[error("Source image is empty")]
    EmptySource,

    /// The computed composition or crop buffer has a zero dimension.
    #[error("Output canvas would be empty ({width}x{height})")]
    ZeroSizedOutput { width: u32, height: u32 },

    /// The composition buffer would exceed the caller's pixel limit.
    #[error("Output canvas of {area} pixels exceeds the limit of {limit}")]
    ExceedsPixelArea { area: u64, limit: u64 },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors from sequencing operations on a [`CropArea`](crate::session::CropArea).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The crop area has not been opened, or has been closed.
    #[error("Crop area is not open")]
    NotOpen,

    /// A rasterization is already in flight for this crop area.
    #[error("A render is already in progress")]
    RenderInProgress,

    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
}
