//! Persisted crop-area snapshot.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};
use crate::rescale::rescale;
use crate::transform::TransformState;

/// Snapshot of a crop session, as handed to render listeners and accepted
/// back by [`CropArea::restore_state`](crate::session::CropArea::restore_state).
///
/// `width`/`height` are the edit canvas size when the snapshot was taken, so
/// `crop_rect` can be rescaled onto a canvas of another size. Unknown fields
/// are ignored when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropAreaState {
    pub width: f64,
    pub height: f64,
    pub rotation_angle: f64,
    pub flipped_horizontally: bool,
    pub flipped_vertically: bool,
    pub crop_rect: Rect,
}

impl CropAreaState {
    pub fn new(canvas: Size, transform: &TransformState, crop_rect: Rect) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            rotation_angle: transform.rotation_angle,
            flipped_horizontally: transform.flipped_horizontally,
            flipped_vertically: transform.flipped_vertically,
            crop_rect,
        }
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The stored orientation, with the angle normalized.
    pub fn transform(&self) -> TransformState {
        let mut transform = TransformState {
            rotation_angle: 0.0,
            flipped_horizontally: self.flipped_horizontally,
            flipped_vertically: self.flipped_vertically,
        };
        transform.rotate_to(self.rotation_angle);
        transform
    }

    /// `crop_rect` mapped onto a canvas of size `current`.
    pub fn rescaled_rect(&self, current: Size, margin: f64) -> Rect {
        if self.canvas_size() == current {
            self.crop_rect
        } else {
            rescale(self.canvas_size(), current, &self.crop_rect, margin)
        }
    }
}
