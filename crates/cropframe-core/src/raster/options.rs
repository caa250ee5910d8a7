//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// Quality used for lossy formats when none is given.
pub const DEFAULT_QUALITY: f64 = 0.92;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Parse a MIME type such as `image/jpeg`.
    pub fn from_mime(mime: &str) -> Result<Self, EncodeError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }
}

/// How the cropped image is sized and encoded.
///
/// `width`/`height` only take effect when `natural_size` is off and both
/// are set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Render at the source's natural resolution.
    pub natural_size: bool,
    /// Requested crop width in pixels.
    pub width: Option<u32>,
    /// Requested crop height in pixels.
    pub height: Option<u32>,
    /// Upper bound on the composition buffer's pixel count.
    pub max_pixel_area: Option<u64>,
    pub format: ImageFormat,
    /// Lossy quality in `0..=1`.
    pub quality: Option<f64>,
}

impl RenderOptions {
    pub fn natural() -> Self {
        Self {
            natural_size: true,
            ..Self::default()
        }
    }

    /// Explicit output dimensions, if both are set.
    pub fn explicit_size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }

    /// Quality mapped to the JPEG encoder's `1..=100` scale.
    pub fn jpeg_quality(&self) -> u8 {
        let quality = self.quality.unwrap_or(DEFAULT_QUALITY);
        let quality = if quality.is_finite() { quality } else { DEFAULT_QUALITY };
        (quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_round_trip() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg] {
            assert_eq!(ImageFormat::from_mime(format.mime_type()).unwrap(), format);
        }
        assert_eq!(ImageFormat::from_mime("IMAGE/JPG").unwrap(), ImageFormat::Jpeg);
        assert!(ImageFormat::from_mime("image/webp").is_err());
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        let mut options = RenderOptions::default();
        assert_eq!(options.jpeg_quality(), 92);
        options.quality = Some(0.5);
        assert_eq!(options.jpeg_quality(), 50);
        options.quality = Some(0.0);
        assert_eq!(options.jpeg_quality(), 1);
        options.quality = Some(7.0);
        assert_eq!(options.jpeg_quality(), 100);
    }

    #[test]
    fn test_explicit_size_needs_both() {
        let options = RenderOptions {
            width: Some(100),
            ..RenderOptions::default()
        };
        assert_eq!(options.explicit_size(), None);

        let options = RenderOptions {
            width: Some(100),
            height: Some(50),
            ..RenderOptions::default()
        };
        assert_eq!(options.explicit_size(), Some((100, 50)));
    }

    #[test]
    fn test_deserialize_partial() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"naturalSize":true,"maxPixelArea":16777216}"#).unwrap();
        assert!(options.natural_size);
        assert_eq!(options.max_pixel_area, Some(16_777_216));
        assert_eq!(options.format, ImageFormat::Png);
    }
}
