//! Rasterization pipeline.
//!
//! Reproduces the interactive edit against the source's full resolution:
//!
//! 1. [`plan_render`] resolves output scale, applies the pixel-area cap and
//!    locates the crop window
//! 2. [`compose`] renders the rotated, flipped and scaled source into a
//!    buffer covering the whole image area
//! 3. [`extract`] copies the crop window into a buffer of exactly its size
//! 4. [`encode`] writes PNG or JPEG
//!
//! Rotation happens about the centre of the whole image, not the crop, so
//! the crop window can only be carved out after the full composition exists.
//!
//! Rasterization is a pure function of its inputs and runs in a single pass.

mod compose;
mod encode;
mod extract;
mod options;
mod plan;

pub use crate::error::{EncodeError, RasterizeError};
pub use compose::compose;
pub use encode::{encode, encode_jpeg, encode_png, EncodedImage};
pub use extract::extract;
pub use options::{ImageFormat, RenderOptions, DEFAULT_QUALITY};
pub use plan::{cap_pixel_area, plan_render, resolve_scale, CropGeometry, PixelRegion, RenderPlan};

use log::debug;

use crate::decode::SourceImage;

/// Render the crop described by `geometry` from `source` and encode it.
///
/// # Errors
///
/// Fails on an empty source, on an empty output, when the output would
/// exceed `max_pixel_area`, or when encoding fails.
pub fn rasterize(
    source: &SourceImage,
    geometry: &CropGeometry,
    options: &RenderOptions,
) -> Result<EncodedImage, RasterizeError> {
    if source.is_empty() {
        return Err(RasterizeError::EmptySource);
    }

    let plan = plan_render(geometry, source.natural_size(), options)?;
    debug!(
        "rasterizing {}x{} composition, crop {:?}",
        plan.canvas_width, plan.canvas_height, plan.crop
    );

    let composed = compose(source, geometry.extent.size(), &geometry.transform, &plan);
    let cropped = extract(&composed, &plan.crop);
    Ok(encode(&cropped, options)?)
}
