//! Core types for source image decoding.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::geometry::Size;

/// Orientation recorded in the EXIF tag, as clockwise quarter turns
/// followed by an optional horizontal mirror.
///
/// Tags 1-8 map onto the eight combinations; anything else is upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orientation {
    pub quarter_turns: u8,
    pub mirrored: bool,
}

impl Orientation {
    pub const UPRIGHT: Orientation = Orientation {
        quarter_turns: 0,
        mirrored: false,
    };

    pub fn from_exif(tag: u32) -> Self {
        let (quarter_turns, mirrored) = match tag {
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => (0, false),
        };
        Self {
            quarter_turns,
            mirrored,
        }
    }

    /// The EXIF tag value (1-8) for this orientation.
    pub fn exif_tag(self) -> u8 {
        match (self.quarter_turns % 4, self.mirrored) {
            (0, false) => 1,
            (0, true) => 2,
            (2, false) => 3,
            (2, true) => 4,
            (1, true) => 5,
            (1, false) => 6,
            (3, true) => 7,
            _ => 8,
        }
    }

    /// Turn and mirror `img` upright.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        let turned = match self.quarter_turns % 4 {
            1 => img.rotate90(),
            2 => img.rotate180(),
            3 => img.rotate270(),
            _ => img,
        };
        if self.mirrored {
            turned.fliph()
        } else {
            turned
        }
    }
}

/// The image being cropped, at its natural (oriented) resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl SourceImage {
    /// Wrap raw RGBA pixels, checking the buffer length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbaImage` for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn natural_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
