//! Output sizing: scale resolution, pixel-area capping and the crop window.

use log::warn;
use serde::{Deserialize, Serialize};

use super::RenderOptions;
use crate::error::RasterizeError;
use crate::geometry::{CanvasExtent, Rect, Size};
use crate::transform::TransformState;

/// Everything about the interactive edit the rasterizer must reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropGeometry {
    pub extent: CanvasExtent,
    pub crop_rect: Rect,
    pub transform: TransformState,
}

/// An integer pixel window inside the composition buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Resolved sizes for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    /// Composition pixels per edit-canvas unit.
    pub x_scale: f64,
    pub y_scale: f64,
    /// Signed per-axis scale applied to the image about the canvas centre.
    pub scale_factors: (f64, f64),
    /// Composition buffer size (the image area, margins excluded).
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Crop window inside the composition buffer.
    pub crop: PixelRegion,
}

impl RenderPlan {
    pub fn canvas_area(&self) -> u64 {
        self.canvas_width as u64 * self.canvas_height as u64
    }
}

/// Pick composition scale factors.
///
/// - natural size: one source pixel per output pixel, undoing the
///   transform's own magnification
/// - explicit size: the crop rectangle maps exactly onto `width x height`
/// - otherwise 1:1 with the edit canvas
pub fn resolve_scale(
    options: &RenderOptions,
    natural: Size,
    base: Size,
    crop: &Rect,
    scale_factors: (f64, f64),
) -> (f64, f64) {
    if options.natural_size {
        let (sfx, sfy) = scale_factors;
        (
            (natural.width / base.width / sfx).abs(),
            (natural.height / base.height / sfy).abs(),
        )
    } else if let Some((width, height)) = options.explicit_size() {
        (width as f64 / crop.width, height as f64 / crop.height)
    } else {
        (1.0, 1.0)
    }
}

/// Shrink both scales uniformly when the composition buffer would meet or
/// exceed `max_pixel_area`.
pub fn cap_pixel_area(
    x_scale: f64,
    y_scale: f64,
    base: Size,
    max_pixel_area: Option<u64>,
) -> (f64, f64) {
    let Some(limit) = max_pixel_area else {
        return (x_scale, y_scale);
    };

    let area = base.width * x_scale * base.height * y_scale;
    if area <= 0.0 || area < limit as f64 {
        return (x_scale, y_scale);
    }

    let shrink = (limit as f64 / area).sqrt();
    warn!(
        "render of {:.0} pixels meets the {} pixel limit; scaling by {:.4}",
        area, limit, shrink
    );
    (x_scale * shrink, y_scale * shrink)
}

/// Resolve the full render plan for `geometry` against a source of
/// `natural` size.
pub fn plan_render(
    geometry: &CropGeometry,
    natural: Size,
    options: &RenderOptions,
) -> Result<RenderPlan, RasterizeError> {
    let base = geometry.extent.size();
    if base.is_degenerate() {
        return Err(RasterizeError::ZeroSizedOutput {
            width: 0,
            height: 0,
        });
    }

    let scale_factors = geometry.transform.scale_factors(base.width, base.height);
    let (x_scale, y_scale) = resolve_scale(
        options,
        natural,
        base,
        &geometry.crop_rect,
        scale_factors,
    );
    let (x_scale, y_scale) = cap_pixel_area(x_scale, y_scale, base, options.max_pixel_area);

    let canvas_width = to_pixels((base.width * x_scale).floor());
    let canvas_height = to_pixels((base.height * y_scale).floor());
    if canvas_width == 0 || canvas_height == 0 {
        return Err(RasterizeError::ZeroSizedOutput {
            width: canvas_width,
            height: canvas_height,
        });
    }

    let area = canvas_width as u64 * canvas_height as u64;
    if let Some(limit) = options.max_pixel_area {
        if area > limit {
            return Err(RasterizeError::ExceedsPixelArea { area, limit });
        }
    }

    let rect = &geometry.crop_rect;
    let margin = geometry.extent.margin;
    let crop = PixelRegion {
        x: ((rect.x - margin) * x_scale).round() as i64,
        y: ((rect.y - margin) * y_scale).round() as i64,
        width: to_pixels((rect.width * x_scale).round()),
        height: to_pixels((rect.height * y_scale).round()),
    };
    if crop.width == 0 || crop.height == 0 {
        return Err(RasterizeError::ZeroSizedOutput {
            width: crop.width,
            height: crop.height,
        });
    }

    Ok(RenderPlan {
        x_scale,
        y_scale,
        scale_factors,
        canvas_width,
        canvas_height,
        crop,
    })
}

/// Saturating float to pixel count; NaN and negatives become zero.
fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(crop_rect: Rect) -> CropGeometry {
        CropGeometry {
            extent: CanvasExtent::new(600.0, 400.0, 20.0),
            crop_rect,
            transform: TransformState::new(),
        }
    }

    #[test]
    fn test_natural_size_doubles() {
        let g = geometry(Rect::new(70.0, 45.0, 300.0, 200.0));
        let plan = plan_render(&g, Size::new(1200.0, 800.0), &RenderOptions::natural()).unwrap();

        assert_eq!((plan.x_scale, plan.y_scale), (2.0, 2.0));
        assert_eq!((plan.canvas_width, plan.canvas_height), (1200, 800));
        assert_eq!(
            plan.crop,
            PixelRegion {
                x: 100,
                y: 50,
                width: 600,
                height: 400
            }
        );
    }

    #[test]
    fn test_natural_size_ignores_flip_sign() {
        let mut g = geometry(Rect::new(20.0, 20.0, 600.0, 400.0));
        g.transform.flip_horizontally();
        let plan = plan_render(&g, Size::new(1200.0, 800.0), &RenderOptions::natural()).unwrap();
        assert_eq!((plan.x_scale, plan.y_scale), (2.0, 2.0));
        assert_eq!(plan.scale_factors, (-1.0, 1.0));
    }

    #[test]
    fn test_screen_size_is_one_to_one() {
        let g = geometry(Rect::new(20.0, 20.0, 100.0, 50.0));
        let plan = plan_render(&g, Size::new(1200.0, 800.0), &RenderOptions::default()).unwrap();
        assert_eq!((plan.x_scale, plan.y_scale), (1.0, 1.0));
        assert_eq!((plan.canvas_width, plan.canvas_height), (600, 400));
        assert_eq!((plan.crop.width, plan.crop.height), (100, 50));
    }

    #[test]
    fn test_explicit_size_maps_crop_exactly() {
        let g = geometry(Rect::new(20.0, 20.0, 150.0, 100.0));
        let options = RenderOptions {
            width: Some(300),
            height: Some(50),
            ..RenderOptions::default()
        };
        let plan = plan_render(&g, Size::new(1200.0, 800.0), &options).unwrap();
        assert_eq!((plan.x_scale, plan.y_scale), (2.0, 0.5));
        assert_eq!((plan.crop.width, plan.crop.height), (300, 50));
    }

    #[test]
    fn test_pixel_cap_shrinks_uniformly() {
        let g = geometry(Rect::new(20.0, 20.0, 600.0, 400.0));
        let options = RenderOptions {
            natural_size: true,
            max_pixel_area: Some(240_000),
            ..RenderOptions::default()
        };
        let plan = plan_render(&g, Size::new(1200.0, 800.0), &options).unwrap();
        assert!((plan.x_scale - 1.0).abs() < 1e-9);
        assert!((plan.y_scale - 1.0).abs() < 1e-9);
        assert!(plan.canvas_area() <= 240_000);
    }

    #[test]
    fn test_cap_not_applied_below_limit() {
        let base = Size::new(600.0, 400.0);
        assert_eq!(cap_pixel_area(2.0, 2.0, base, Some(1_000_000)), (2.0, 2.0));
        assert_eq!(cap_pixel_area(2.0, 2.0, base, None), (2.0, 2.0));
    }

    #[test]
    fn test_zero_limit_is_an_error() {
        let g = geometry(Rect::new(20.0, 20.0, 600.0, 400.0));
        let options = RenderOptions {
            max_pixel_area: Some(0),
            ..RenderOptions::default()
        };
        assert!(matches!(
            plan_render(&g, Size::new(10.0, 10.0), &options),
            Err(RasterizeError::ZeroSizedOutput { .. })
        ));
    }

    #[test]
    fn test_degenerate_canvas() {
        let mut g = geometry(Rect::new(20.0, 20.0, 10.0, 10.0));
        g.extent = CanvasExtent::new(0.0, 400.0, 20.0);
        assert!(plan_render(&g, Size::new(10.0, 10.0), &RenderOptions::default()).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
