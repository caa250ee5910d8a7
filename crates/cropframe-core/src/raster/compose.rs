//! Rendering the transformed source into the composition buffer.
//!
//! # Algorithm
//!
//! The source is stretched over the image area of the edit canvas, then
//! transformed about the canvas centre `c`: translate to `c`, rotate by the
//! rotation angle, scale by the signed scale factors `S`, translate back.
//!
//! The buffer is filled by inverse mapping. Each output pixel centre `p` is
//! converted to canvas units `u = p / scale`, then
//!
//! ```text
//! q   = c + S^-1 * R(-angle) * (u - c)
//! src = q * (source size / canvas size)
//! ```
//!
//! and the source is sampled bilinearly at `src`. Pixels that map outside
//! the source stay transparent.

use image::{Rgba, RgbaImage};

use super::RenderPlan;
use crate::decode::SourceImage;
use crate::geometry::Size;
use crate::transform::TransformState;

/// Render `source` into a buffer of `plan.canvas_width x plan.canvas_height`.
///
/// `base` is the edit canvas size the transform was applied against.
pub fn compose(
    source: &SourceImage,
    base: Size,
    transform: &TransformState,
    plan: &RenderPlan,
) -> RgbaImage {
    // Fast path: nothing to resample
    if transform.is_identity()
        && plan.canvas_width == source.width
        && plan.canvas_height == source.height
    {
        if let Some(copy) = source.to_rgba_image() {
            return copy;
        }
    }

    let angle = transform.rotation_angle.to_radians();
    let cos = angle.cos();
    let sin = angle.sin();
    let (sfx, sfy) = plan.scale_factors;

    let cx = base.width / 2.0;
    let cy = base.height / 2.0;
    let to_source_x = source.width as f64 / base.width;
    let to_source_y = source.height as f64 / base.height;

    let mut output = RgbaImage::new(plan.canvas_width, plan.canvas_height);
    for (px, py, pixel) in output.enumerate_pixels_mut() {
        let dx = (px as f64 + 0.5) / plan.x_scale - cx;
        let dy = (py as f64 + 0.5) / plan.y_scale - cy;

        // Inverse rotation
        let rx = dx * cos + dy * sin;
        let ry = -dx * sin + dy * cos;

        let src_x = (cx + rx / sfx) * to_source_x;
        let src_y = (cy + ry / sfy) * to_source_y;

        *pixel = Rgba(sample_bilinear(source, src_x, src_y));
    }
    output
}

#[inline]
fn get_pixel_f64(image: &SourceImage, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width as usize + px) * 4;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
        image.pixels[idx + 3] as f64,
    ]
}

/// Sample at continuous coordinates where pixel `(i, j)` covers
/// `[i, i+1) x [j, j+1)`. Outside the image the result is transparent.
fn sample_bilinear(image: &SourceImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width as f64, image.height as f64);
    if image.is_empty() || !(x >= 0.0 && x < w && y >= 0.0 && y < h) {
        return [0, 0, 0, 0];
    }

    // Interpolate between pixel centres, clamping at the border
    let fx = (x - 0.5).clamp(0.0, w - 1.0);
    let fy = (y - 0.5).clamp(0.0, h - 1.0);
    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - tx) + p10[c] * tx;
        let bottom = p01[c] * (1.0 - tx) + p11[c] * tx;
        let value = top * (1.0 - ty) + bottom * ty;
        result[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    result
}
