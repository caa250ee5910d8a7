//! Geometry primitives shared by the controller, zoom model and rasterizer.
//!
//! # Coordinate System
//!
//! All rectangles live in edit-canvas coordinates. The edit canvas is the
//! displayed image surrounded by a fixed margin, so the image itself occupies
//! `[margin, margin + width] x [margin, margin + height]`. Origin is the
//! top-left corner of the margin, y grows downward.

use serde::{Deserialize, Serialize};

/// Minimum width and height of a crop rectangle, in canvas units.
pub const MIN_SIZE: f64 = 10.0;

/// Radius of a resize grip. The hit area is 1.5 times this radius.
pub const GRIP_SIZE: f64 = 10.0;

/// A point in edit-canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point.
    pub fn distance_squared(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height without a position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Round both dimensions to whole canvas units.
    pub fn rounded(&self) -> Size {
        Size::new(self.width.round(), self.height.round())
    }
}

/// Axis-aligned rectangle in edit-canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Shrink the rectangle by `inset` on every side.
    ///
    /// Returns the rectangle unchanged if the inset would leave less than
    /// [`MIN_SIZE`] in either dimension.
    pub fn inset(&self, inset: f64) -> Rect {
        if inset <= 0.0
            || self.width - 2.0 * inset < MIN_SIZE
            || self.height - 2.0 * inset < MIN_SIZE
        {
            return *self;
        }
        Rect::new(
            self.x + inset,
            self.y + inset,
            self.width - 2.0 * inset,
            self.height - 2.0 * inset,
        )
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Size of the editable surface plus the margin drawn around it.
///
/// `width` and `height` describe the displayed image only; the full canvas
/// is `width + 2 * margin` by `height + 2 * margin`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasExtent {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl CanvasExtent {
    pub const fn new(width: f64, height: f64, margin: f64) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Same margin, different image size.
    pub fn with_size(&self, size: Size) -> CanvasExtent {
        CanvasExtent::new(size.width, size.height, self.margin)
    }

    /// The rectangle covered by the image itself.
    pub fn image_rect(&self) -> Rect {
        Rect::new(self.margin, self.margin, self.width, self.height)
    }

    /// Total canvas size including the margin on both sides.
    pub fn outer_size(&self) -> Size {
        Size::new(
            self.width + 2.0 * self.margin,
            self.height + 2.0 * self.margin,
        )
    }

    /// Largest box with the image's aspect ratio that fits in a container.
    ///
    /// Used when the editor is shown in a container whose shape differs from
    /// the image, e.g. a popup that follows the window size.
    pub fn fit_within(image: Size, container: Size) -> Size {
        if image.is_degenerate() || container.is_degenerate() {
            return container;
        }
        let ratio = image.width / image.height;
        if container.width / ratio > container.height {
            Size::new(container.height * ratio, container.height)
        } else {
            Size::new(container.width, container.width / ratio)
        }
    }
}

/// One of the four corner grips used to resize the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    /// Hit-test priority order.
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::BottomLeft,
        Handle::TopRight,
        Handle::BottomRight,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight)
    }

    /// Centre of this grip on the given rectangle.
    pub fn position(self, rect: &Rect) -> Point {
        let x = if self.is_left() { rect.x } else { rect.right() };
        let y = if self.is_top() { rect.y } else { rect.bottom() };
        Point::new(x, y)
    }

    /// Find the grip under `point`, if any.
    pub fn hit_test(rect: &Rect, point: Point) -> Option<Handle> {
        let radius = GRIP_SIZE * 1.5;
        Handle::ALL
            .into_iter()
            .find(|handle| handle.position(rect).distance_squared(point) <= radius * radius)
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    /// The rectangle body; dragging moves the rectangle.
    Body,
    /// A corner grip; dragging resizes from that corner.
    Handle(Handle),
}

/// Resolve the hit target for a point over a (visible) crop rectangle.
///
/// Grips win over the body since they overlap its corners.
pub fn hit_test_target(rect: &Rect, point: Point) -> Option<HitTarget> {
    if let Some(handle) = Handle::hit_test(rect, point) {
        return Some(HitTarget::Handle(handle));
    }
    rect.contains(point).then_some(HitTarget::Body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_inset() {
        let r = Rect::new(20.0, 20.0, 400.0, 300.0);
        assert_eq!(r.inset(10.0), Rect::new(30.0, 30.0, 380.0, 280.0));
        // Too large an inset leaves the rectangle alone
        assert_eq!(r.inset(200.0), r);
    }

    #[test]
    fn test_handle_positions() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(Handle::TopLeft.position(&r), Point::new(0.0, 0.0));
        assert_eq!(Handle::TopRight.position(&r), Point::new(100.0, 0.0));
        assert_eq!(Handle::BottomLeft.position(&r), Point::new(0.0, 50.0));
        assert_eq!(Handle::BottomRight.position(&r), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_hit_test_prefers_grips() {
        let r = Rect::new(20.0, 20.0, 200.0, 100.0);
        assert_eq!(
            hit_test_target(&r, Point::new(22.0, 21.0)),
            Some(HitTarget::Handle(Handle::TopLeft))
        );
        assert_eq!(
            hit_test_target(&r, Point::new(219.0, 118.0)),
            Some(HitTarget::Handle(Handle::BottomRight))
        );
        assert_eq!(
            hit_test_target(&r, Point::new(120.0, 70.0)),
            Some(HitTarget::Body)
        );
        assert_eq!(hit_test_target(&r, Point::new(400.0, 400.0)), None);
    }

    #[test]
    fn test_grip_hit_area_extends_outside_rect() {
        let r = Rect::new(20.0, 20.0, 200.0, 100.0);
        // 10 units left of the corner is within the 15 unit grip radius
        assert_eq!(
            hit_test_target(&r, Point::new(10.0, 20.0)),
            Some(HitTarget::Handle(Handle::TopLeft))
        );
    }

    #[test]
    fn test_fit_within_wide_container() {
        let fitted = CanvasExtent::fit_within(Size::new(400.0, 300.0), Size::new(1000.0, 600.0));
        assert_eq!(fitted, Size::new(800.0, 600.0));
    }

    #[test]
    fn test_fit_within_tall_container() {
        let fitted = CanvasExtent::fit_within(Size::new(400.0, 300.0), Size::new(400.0, 900.0));
        assert_eq!(fitted, Size::new(400.0, 300.0));
    }

    #[test]
    fn test_outer_size() {
        let extent = CanvasExtent::new(400.0, 300.0, 20.0);
        assert_eq!(extent.outer_size(), Size::new(440.0, 340.0));
        assert_eq!(extent.image_rect(), Rect::new(20.0, 20.0, 400.0, 300.0));
    }

    #[test]
    fn test_degenerate_size() {
        assert!(Size::new(0.0, 10.0).is_degenerate());
        assert!(Size::new(10.0, f64::NAN).is_degenerate());
        assert!(!Size::new(10.0, 10.0).is_degenerate());
    }
}
