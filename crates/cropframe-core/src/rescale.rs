//! Mapping a crop rectangle between two canvas sizes.
//!
//! Used for live container resizes (old/new = before/after the resize) and
//! for restoring a saved [`CropAreaState`](crate::state::CropAreaState)
//! against a canvas of a different size.

use log::debug;

use crate::geometry::{Rect, Size};

/// Scale `rect` from a canvas of size `old` to one of size `new`.
///
/// The margin is excluded from scaling: positions are measured from the
/// margin, scaled, and the margin added back. A degenerate `old` size leaves
/// the rectangle unchanged.
pub fn rescale(old: Size, new: Size, rect: &Rect, margin: f64) -> Rect {
    if old.is_degenerate() || new.is_degenerate() {
        debug!("skipping rescale between degenerate canvases {old:?} -> {new:?}");
        return *rect;
    }

    let x_scale = new.width / old.width;
    let y_scale = new.height / old.height;

    Rect::new(
        (rect.x - margin) * x_scale + margin,
        (rect.y - margin) * y_scale + margin,
        rect.width * x_scale,
        rect.height * y_scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_canvas() {
        let rect = Rect::new(20.0, 20.0, 100.0, 100.0);
        let scaled = rescale(Size::new(200.0, 200.0), Size::new(400.0, 400.0), &rect, 20.0);
        assert_eq!(scaled, Rect::new(20.0, 20.0, 200.0, 200.0));
    }

    #[test]
    fn test_offset_scales_from_margin() {
        let rect = Rect::new(70.0, 45.0, 100.0, 50.0);
        let scaled = rescale(Size::new(400.0, 300.0), Size::new(200.0, 600.0), &rect, 20.0);
        assert_eq!(scaled, Rect::new(45.0, 70.0, 50.0, 100.0));
    }

    #[test]
    fn test_same_size_is_identity() {
        let rect = Rect::new(33.3, 44.4, 55.5, 66.6);
        let size = Size::new(640.0, 480.0);
        assert!(rescale(size, size, &rect, 20.0).approx_eq(&rect, 1e-9));
    }

    #[test]
    fn test_degenerate_old_size() {
        let rect = Rect::new(20.0, 20.0, 100.0, 100.0);
        assert_eq!(
            rescale(Size::new(0.0, 200.0), Size::new(400.0, 400.0), &rect, 20.0),
            rect
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
