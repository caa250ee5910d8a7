//! Orientation applied to the source image before cropping.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen (y down)
//! - Angles are kept normalized to `(-180, 180]`
//! - Flips are applied in the image's own frame, before rotation

use serde::{Deserialize, Serialize};

/// Pointer travel, in canvas units, per degree of straightening.
pub const STRAIGHTEN_DRAG_RATIO: f64 = 5.0;

/// Normalize an angle in degrees to `(-180, 180]`.
///
/// Non-finite input normalizes to `0`.
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    if !angle_degrees.is_finite() {
        return 0.0;
    }
    let angle = angle_degrees % 360.0;
    if angle > 180.0 {
        angle - 360.0
    } else if angle <= -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Rotation and flip state of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    pub rotation_angle: f64,
    pub flipped_horizontally: bool,
    pub flipped_vertically: bool,
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the transform leaves the image untouched.
    pub fn is_identity(&self) -> bool {
        self.rotation_angle == 0.0 && !self.flipped_horizontally && !self.flipped_vertically
    }

    /// Set an absolute angle.
    pub fn rotate_to(&mut self, angle_degrees: f64) {
        self.rotation_angle = normalize_angle(angle_degrees);
    }

    /// Rotate relative to the current angle.
    pub fn rotate_by(&mut self, delta_degrees: f64) {
        self.rotate_to(self.rotation_angle + delta_degrees);
    }

    /// Quarter turn counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.rotate_by(-90.0);
    }

    /// Quarter turn clockwise.
    pub fn rotate_right(&mut self) {
        self.rotate_by(90.0);
    }

    pub fn flip_horizontally(&mut self) {
        self.flipped_horizontally = !self.flipped_horizontally;
    }

    pub fn flip_vertically(&mut self) {
        self.flipped_vertically = !self.flipped_vertically;
    }

    /// Straighten from a horizontal drag on the straighten control.
    pub fn straighten_by_drag(&mut self, pointer_dx: f64) {
        self.rotate_by(pointer_dx / STRAIGHTEN_DRAG_RATIO);
    }

    /// `-1` for a flipped axis, `1` otherwise.
    pub fn flip_signs(&self) -> (f64, f64) {
        (
            if self.flipped_horizontally { -1.0 } else { 1.0 },
            if self.flipped_vertically { -1.0 } else { 1.0 },
        )
    }

    /// Uniform magnification that keeps a `width x height` canvas fully
    /// covered by the image once it is rotated about the canvas centre.
    ///
    /// The rotated image of size `s*w x s*h` contains the canvas when
    /// `s >= (w|cos| + h|sin|) / w` and `s >= (w|sin| + h|cos|) / h`.
    pub fn cover_scale(&self, width: f64, height: f64) -> f64 {
        if self.rotation_angle == 0.0 || width <= 0.0 || height <= 0.0 {
            return 1.0;
        }
        let angle = self.rotation_angle.to_radians();
        let cos = angle.cos().abs();
        let sin = angle.sin().abs();
        let sx = (width * cos + height * sin) / width;
        let sy = (width * sin + height * cos) / height;
        sx.max(sy).max(1.0)
    }

    /// Signed scale factors applied while compositing: cover scale with the
    /// flip folded into the sign.
    pub fn scale_factors(&self, width: f64, height: f64) -> (f64, f64) {
        let scale = self.cover_scale(width, height);
        let (fx, fy) = self.flip_signs();
        (fx * scale, fy * scale)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
