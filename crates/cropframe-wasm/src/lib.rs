//! Cropframe WASM - WebAssembly bindings for Cropframe
//!
//! This crate exposes the cropframe-core crop area to JavaScript/TypeScript
//! applications. The host page owns the DOM: it forwards pointer events,
//! redraws from [`JsCropArea::view`] after each change, and shows the
//! encoded result.
//!
//! # Module Structure
//!
//! - `area` - Interactive crop session and asynchronous rasterization
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Source image decoding (PNG, JPEG with EXIF orientation)
//! - `logger` - Console logging and panic hook setup
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_source, JsCropArea, set_log_level } from '@cropframe/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//! set_log_level('debug');
//!
//! const source = decode_source(new Uint8Array(await file.arrayBuffer()));
//! const area = new JsCropArea({ margin: 20, gridLines: 2 });
//! area.open(displayWidth, displayHeight);
//! area.set_aspect_ratio(16, 9);
//!
//! const result = await area.rasterize(source, { naturalSize: true });
//! ```

use wasm_bindgen::prelude::*;

mod area;
mod decode;
mod logger;
mod types;

// Re-export public types
pub use area::{aspect_ratio_presets, JsCropArea};
pub use decode::{decode_source, get_orientation};
pub use types::{JsEncodedImage, JsSourceImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Warn);
}

/// Set the console log level: `off`, `error`, `warn`, `info`, `debug` or
/// `trace`. Unknown names select `warn`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::install(logger::parse_level(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
