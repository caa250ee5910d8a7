//! Carving the crop window out of the composition buffer.

use image::{imageops, RgbaImage};

use super::PixelRegion;

/// Copy `region` out of `composed` into a buffer of exactly the region's
/// size. Parts of the region outside the composition stay transparent.
pub fn extract(composed: &RgbaImage, region: &PixelRegion) -> RgbaImage {
    let mut cropped = RgbaImage::new(region.width, region.height);
    imageops::replace(&mut cropped, composed, -region.x, -region.y);
    cropped
}
