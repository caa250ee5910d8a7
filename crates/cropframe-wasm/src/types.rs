//! WASM-compatible wrapper types for image data.

use cropframe_core::raster::{EncodedImage, ImageFormat};
use cropframe_core::SourceImage;
use wasm_bindgen::prelude::*;

/// The image being cropped, as RGBA pixels at natural resolution.
///
/// Build one from `ImageData` (`new JsSourceImage(w, h, data.data)`) or with
/// [`decode_source`](crate::decode::decode_source).
#[wasm_bindgen]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Wrap RGBA pixel data (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsSourceImage, JsValue> {
        SourceImage::new(width, height, pixels)
            .map(|inner| JsSourceImage { inner })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }
}

impl JsSourceImage {
    pub(crate) fn from_source(inner: SourceImage) -> Self {
        Self { inner }
    }

    pub(crate) fn source(&self) -> &SourceImage {
        &self.inner
    }
}

/// A rendered crop.
#[wasm_bindgen]
pub struct JsEncodedImage {
    inner: EncodedImage,
}

#[wasm_bindgen]
impl JsEncodedImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// MIME type of the encoded bytes, e.g. `image/png`.
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type().to_string()
    }

    /// Encoded file bytes as Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// The image as a `data:` URL, ready for an `<img>` element.
    pub fn to_data_url(&self) -> String {
        self.inner.to_data_url()
    }
}

impl JsEncodedImage {
    pub(crate) fn from_encoded(inner: EncodedImage) -> Self {
        Self { inner }
    }
}

/// Parse a MIME type into an output format.
pub(crate) fn format_from_mime(mime: &str) -> Result<ImageFormat, JsValue> {
    ImageFormat::from_mime(mime).map_err(|e| JsValue::from_str(&e.to_string()))
}
