//! Source image decoding.
//!
//! The rasterizer works on the source at its natural resolution. Browsers
//! report the natural size of a JPEG after EXIF orientation, so decoding
//! applies the orientation tag before handing pixels to the pipeline.
//!
//! # Examples
//!
//! ```ignore
//! use cropframe_core::decode::decode_source;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let source = decode_source(&bytes).unwrap();
//! println!("Natural size {}x{}", source.width, source.height);
//! ```

mod source;
mod types;

pub use crate::error::DecodeError;
pub use source::{decode_source, get_orientation};
pub use types::{Orientation, SourceImage};
