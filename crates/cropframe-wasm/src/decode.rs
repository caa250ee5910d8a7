//! Source decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_source } from '@cropframe/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const source = decode_source(bytes);
//! console.log(`Natural size ${source.width}x${source.height}`);
//! ```

use crate::types::JsSourceImage;
use cropframe_core::decode;
use wasm_bindgen::prelude::*;

/// Decode PNG or JPEG bytes, applying EXIF orientation.
///
/// # Errors
///
/// Returns an error if the format is unrecognized or the data is corrupt.
#[wasm_bindgen]
pub fn decode_source(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_source(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read the EXIF orientation tag (1-8) without decoding pixels.
#[wasm_bindgen]
pub fn get_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes).exif_tag()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_of_garbage_is_normal() {
        assert_eq!(get_orientation(&[0x00, 0x01, 0x02]), 1);
    }
}
