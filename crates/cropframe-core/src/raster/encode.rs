//! PNG and JPEG encoding of the cropped buffer.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use super::{ImageFormat, RenderOptions};
use crate::error::EncodeError;

/// The rendered crop as encoded bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), BASE64.encode(&self.bytes))
    }
}

fn validate(pixels: &[u8], width: u32, height: u32, channels: usize) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 4)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Png.name(),
            message: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}

/// Encode RGB pixel data to JPEG bytes.
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 3)?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Jpeg.name(),
            message: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}

/// Encode the cropped buffer in the format `options` asks for.
///
/// JPEG has no alpha channel; transparent pixels come out black.
pub fn encode(image: &RgbaImage, options: &RenderOptions) -> Result<EncodedImage, EncodeError> {
    let (width, height) = image.dimensions();
    let bytes = match options.format {
        ImageFormat::Png => encode_png(image.as_raw(), width, height)?,
        ImageFormat::Jpeg => {
            let rgb: Vec<u8> = image
                .as_raw()
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect();
            encode_jpeg(&rgb, width, height, options.jpeg_quality())?
        }
    };

    Ok(EncodedImage {
        format: options.format,
        width,
        height,
        bytes,
    })
}
