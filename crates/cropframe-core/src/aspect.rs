//! Aspect-ratio value object and the constraint engine that fits a crop
//! rectangle to a ratio.
//!
//! A ratio of `0:0` is the "free-form" sentinel: no constraint applies and
//! the length helpers must not be called with it. Use
//! [`AspectRatio::constraint`] to get an `Option` that is `None` for the
//! sentinel.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::{CanvasExtent, Rect, MIN_SIZE};

/// A `horizontal : vertical` aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AspectRatio {
    pub horizontal: f64,
    pub vertical: f64,
}

impl AspectRatio {
    /// Free-form selection.
    pub const FREE: AspectRatio = AspectRatio::new(0.0, 0.0);

    /// Ratios offered by the toolbar, free-form first.
    pub const PRESETS: [AspectRatio; 8] = [
        AspectRatio::FREE,
        AspectRatio::new(1.0, 1.0),
        AspectRatio::new(4.0, 3.0),
        AspectRatio::new(3.0, 4.0),
        AspectRatio::new(3.0, 2.0),
        AspectRatio::new(2.0, 3.0),
        AspectRatio::new(16.0, 9.0),
        AspectRatio::new(9.0, 16.0),
    ];

    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// True for the `0:0` sentinel and for any ratio with a side that is
    /// non-positive or not finite.
    pub fn is_free(&self) -> bool {
        let usable = |side: f64| side.is_finite() && side > 0.0;
        !(usable(self.horizontal) && usable(self.vertical))
    }

    /// `Some(self)` when this ratio actually constrains the rectangle.
    pub fn constraint(self) -> Option<AspectRatio> {
        (!self.is_free()).then_some(self)
    }

    /// `horizontal / vertical`.
    pub fn ratio(&self) -> f64 {
        self.horizontal / self.vertical
    }

    /// Height matching the given width.
    pub fn vertical_length(&self, horizontal_length: f64) -> f64 {
        horizontal_length / self.ratio()
    }

    /// Width matching the given height.
    pub fn horizontal_length(&self, vertical_length: f64) -> f64 {
        vertical_length * self.ratio()
    }

    /// Smallest width whose derived height still respects [`MIN_SIZE`].
    pub fn min_width(&self) -> f64 {
        MIN_SIZE.max(self.horizontal_length(MIN_SIZE))
    }

    /// Short label such as `16:9`, or `free`.
    pub fn label(&self) -> String {
        if self.is_free() {
            "free".to_string()
        } else {
            format!("{}:{}", self.horizontal, self.vertical)
        }
    }
}

/// Height matching `horizontal_length` under `ratio`.
///
/// Never call this with the free-form sentinel; the division is unchecked.
pub fn vertical_length(ratio: &AspectRatio, horizontal_length: f64) -> f64 {
    ratio.vertical_length(horizontal_length)
}

/// Width matching `vertical_length` under `ratio`.
pub fn horizontal_length(ratio: &AspectRatio, vertical_length: f64) -> f64 {
    ratio.horizontal_length(vertical_length)
}

/// Fit `rect` to `ratio`, keeping its centre and staying inside the canvas.
///
/// Rectangles that already match the ratio (to the nearest unit) are
/// returned unchanged, which makes the operation idempotent. Free-form
/// ratios never change the rectangle.
///
/// # Algorithm
///
/// 1. Compute the width implied by the current height and the height implied
///    by the current width, and keep whichever needs less of the canvas.
/// 2. Shrink uniformly if the result is still wider or taller than the
///    canvas, and grow uniformly if it fell below [`MIN_SIZE`].
/// 3. If a ratio too extreme for the canvas grew past it, cap each side at
///    the canvas. The ratio gives way in that case.
/// 4. Re-centre on the previous centre, then push the rectangle back inside
///    `[margin, margin + canvas]` on both axes.
pub fn adjust_to_ratio(rect: &Rect, ratio: &AspectRatio, extent: &CanvasExtent) -> Rect {
    let Some(ratio) = ratio.constraint() else {
        return *rect;
    };

    if rect.height.round() == ratio.vertical_length(rect.width).round() {
        return *rect;
    }

    let center = rect.center();
    let mut width = rect.width;
    let mut height = rect.height;

    let ar_width = ratio.horizontal_length(rect.height);
    let ar_height = ratio.vertical_length(rect.width);

    if ar_width / extent.width < ar_height / extent.height {
        width = ar_width;
    } else {
        height = ar_height;
    }

    if width > extent.width {
        height /= width / extent.width;
        width = extent.width;
    }
    if height > extent.height {
        width /= height / extent.height;
        height = extent.height;
    }

    let min_width = ratio.min_width();
    if width < min_width {
        width = min_width;
        height = ratio.vertical_length(width);
    }
    width = width.min(extent.width);
    height = height.min(extent.height);

    let mut x = center.x - width / 2.0;
    let mut y = center.y - height / 2.0;
    if x + width > extent.margin + extent.width {
        x = extent.margin + extent.width - width;
    }
    if y + height > extent.margin + extent.height {
        y = extent.margin + extent.height - height;
    }
    x = x.max(extent.margin);
    y = y.max(extent.margin);

    let adjusted = Rect::new(x, y, width, height);
    debug!(
        "fitted crop rectangle to {}: {:?} -> {:?}",
        ratio.label(),
        rect,
        adjusted
    );
    adjusted
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ratio_strategy() -> impl Strategy<Value = AspectRatio> {
        (1u32..=21, 1u32..=21).prop_map(|(h, v)| AspectRatio::new(h as f64, v as f64))
    }

    /// Everyday ratios plus ones too extreme for some canvases.
    fn any_ratio_strategy() -> impl Strategy<Value = AspectRatio> {
        prop_oneof![
            3 => ratio_strategy(),
            1 => (1u32..=200).prop_map(|v| AspectRatio::new(1.0, v as f64)),
            1 => (1u32..=200).prop_map(|h| AspectRatio::new(h as f64, 1.0)),
        ]
    }

    /// Whether a rectangle of at least minimum size fits under `ratio`.
    fn ratio_fits(ratio: &AspectRatio, extent: &CanvasExtent) -> bool {
        let width = ratio.min_width();
        width <= extent.width && ratio.vertical_length(width) <= extent.height
    }

    /// A canvas and a rectangle inside it.
    fn rect_in_canvas() -> impl Strategy<Value = (CanvasExtent, Rect)> {
        (100.0f64..=1000.0, 100.0f64..=1000.0, 0.0f64..=40.0).prop_flat_map(|(w, h, m)| {
            (10.0..=w, 10.0..=h).prop_flat_map(move |(rw, rh)| {
                (0.0..=(w - rw), 0.0..=(h - rh)).prop_map(move |(ox, oy)| {
                    (
                        CanvasExtent::new(w, h, m),
                        Rect::new(m + ox, m + oy, rw, rh),
                    )
                })
            })
        })
    }

    proptest! {
        /// Property: Adjusting twice gives the same rectangle as adjusting once.
        #[test]
        fn prop_adjust_is_idempotent(
            (extent, rect) in rect_in_canvas(),
            ratio in any_ratio_strategy(),
        ) {
            let once = adjust_to_ratio(&rect, &ratio, &extent);
            let twice = adjust_to_ratio(&once, &ratio, &extent);
            prop_assert!(once.approx_eq(&twice, 1.0), "{:?} vs {:?}", once, twice);
        }

        /// Property: The adjusted rectangle satisfies the ratio.
        #[test]
        fn prop_adjust_satisfies_ratio(
            (extent, rect) in rect_in_canvas(),
            ratio in ratio_strategy(),
        ) {
            prop_assume!(ratio_fits(&ratio, &extent));
            let adjusted = adjust_to_ratio(&rect, &ratio, &extent);
            let expected = ratio.vertical_length(adjusted.width);
            prop_assert!((adjusted.height - expected).abs() <= 1.0);
        }

        /// Property: The adjusted rectangle stays inside the canvas on all
        /// four edges, whatever the ratio.
        #[test]
        fn prop_adjust_stays_in_canvas(
            (extent, rect) in rect_in_canvas(),
            ratio in any_ratio_strategy(),
        ) {
            let adjusted = adjust_to_ratio(&rect, &ratio, &extent);
            prop_assert!(adjusted.x >= extent.margin, "{:?}", adjusted);
            prop_assert!(adjusted.y >= extent.margin, "{:?}", adjusted);
            prop_assert!(adjusted.right() <= extent.margin + extent.width + 1e-9, "{:?}", adjusted);
            prop_assert!(adjusted.bottom() <= extent.margin + extent.height + 1e-9, "{:?}", adjusted);
        }
    }
}
