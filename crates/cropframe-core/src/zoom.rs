//! Zoom-to-crop viewport model.
//!
//! When zoom-to-crop is enabled the displayed image is magnified so the crop
//! rectangle fills the canvas. The crop rectangle itself is never changed by
//! zooming; only its on-screen placement (the *visible* rectangle) is.

use serde::{Deserialize, Serialize};

use crate::geometry::{CanvasExtent, Point, Rect};

/// Current magnification and whether zoom-to-crop is on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    pub zoom_factor: f64,
    pub enabled: bool,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            enabled: false,
        }
    }
}

/// Result of [`compute_zoom`]: the magnification and where the magnified
/// crop rectangle lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPlacement {
    pub zoom_factor: f64,
    pub visible: Rect,
}

impl ZoomPlacement {
    pub fn visible_origin(&self) -> Point {
        Point::new(self.visible.x, self.visible.y)
    }
}

/// Magnify `crop` so it fills the canvas and centre it on the free axis.
///
/// A crop narrower than the canvas is pinned to the top margin and centred
/// horizontally; a wider one is pinned to the left margin and centred
/// vertically. A crop with exactly the canvas shape lands at
/// `(margin, margin)`.
pub fn compute_zoom(crop: &Rect, extent: &CanvasExtent) -> ZoomPlacement {
    if crop.width <= 0.0 || crop.height <= 0.0 {
        return ZoomPlacement {
            zoom_factor: 1.0,
            visible: *crop,
        };
    }

    let zoom_factor = (extent.width / crop.width).min(extent.height / crop.height);
    let width = crop.width * zoom_factor;
    let height = crop.height * zoom_factor;

    let crop_shape = crop.height / crop.width;
    let canvas_shape = extent.height / extent.width;

    let x = if crop_shape < canvas_shape {
        extent.margin
    } else {
        extent.margin + extent.width / 2.0 - width / 2.0
    };
    let y = if crop_shape > canvas_shape {
        extent.margin
    } else {
        extent.margin + extent.height / 2.0 - height / 2.0
    };

    ZoomPlacement {
        zoom_factor,
        visible: Rect::new(x, y, width, height),
    }
}

impl ZoomState {
    /// Turn zoom-to-crop on and compute the factor for `crop`.
    pub fn enable(&mut self, crop: &Rect, extent: &CanvasExtent) {
        self.enabled = true;
        self.refresh(crop, extent);
    }

    /// Reset to identity placement.
    pub fn unzoom(&mut self) {
        self.enabled = false;
        self.zoom_factor = 1.0;
    }

    /// Recompute the factor after the crop rectangle or canvas changed.
    pub fn refresh(&mut self, crop: &Rect, extent: &CanvasExtent) {
        self.zoom_factor = if self.enabled {
            compute_zoom(crop, extent).zoom_factor
        } else {
            1.0
        };
    }

    /// Where `crop` is drawn on screen.
    pub fn visible_rect(&self, crop: &Rect, extent: &CanvasExtent) -> Rect {
        if self.enabled {
            compute_zoom(crop, extent).visible
        } else {
            *crop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> CanvasExtent {
        CanvasExtent::new(400.0, 300.0, 20.0)
    }

    #[test]
    fn test_matching_shape_fills_canvas() {
        let placement = compute_zoom(&Rect::new(100.0, 60.0, 200.0, 150.0), &extent());
        assert_eq!(placement.zoom_factor, 2.0);
        assert_eq!(placement.visible_origin(), Point::new(20.0, 20.0));
        assert_eq!(placement.visible, Rect::new(20.0, 20.0, 400.0, 300.0));
    }

    #[test]
    fn test_narrow_crop_centred_horizontally() {
        // 100x150 crop: height-limited, factor 2
        let placement = compute_zoom(&Rect::new(50.0, 50.0, 100.0, 150.0), &extent());
        assert_eq!(placement.zoom_factor, 2.0);
        assert_eq!(placement.visible, Rect::new(120.0, 20.0, 200.0, 300.0));
    }

    #[test]
    fn test_wide_crop_centred_vertically() {
        // 200x50 crop: width-limited, factor 2
        let placement = compute_zoom(&Rect::new(50.0, 50.0, 200.0, 50.0), &extent());
        assert_eq!(placement.zoom_factor, 2.0);
        assert_eq!(placement.visible, Rect::new(20.0, 120.0, 400.0, 100.0));
    }

    #[test]
    fn test_disabled_zoom_is_identity() {
        let state = ZoomState::default();
        let crop = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(state.visible_rect(&crop, &extent()), crop);
        assert_eq!(state.zoom_factor, 1.0);
    }

    #[test]
    fn test_enable_then_unzoom() {
        let mut state = ZoomState::default();
        let crop = Rect::new(50.0, 50.0, 100.0, 75.0);
        state.enable(&crop, &extent());
        assert!(state.enabled);
        assert_eq!(state.zoom_factor, 4.0);

        state.unzoom();
        assert!(!state.enabled);
        assert_eq!(state.zoom_factor, 1.0);
        assert_eq!(state.visible_rect(&crop, &extent()), crop);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
