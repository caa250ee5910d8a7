//! Stateless projection of the controller into drawable geometry.
//!
//! Callers run [`sync_view`] after every committed change and redraw from the
//! returned [`CropView`]. Nothing here holds on to display objects.

use serde::{Deserialize, Serialize};

use crate::controller::CropController;
use crate::geometry::{CanvasExtent, Handle, Point, Rect};
use crate::transform::TransformState;

/// Drawing settings that are not part of the crop geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    /// Number of alignment lines per axis.
    pub grid_lines: u32,
    pub grid_visible: bool,
    /// Cleared while a render is in flight.
    pub shade_visible: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            grid_lines: 2,
            grid_visible: true,
            shade_visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grip {
    pub handle: Handle,
    pub center: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// How to draw the image under the overlay so it matches the rendered
/// output: rotate by `rotation_angle` degrees, then scale by
/// `scale_factors`, both about `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTransform {
    /// Centre of the image area in canvas units.
    pub origin: Point,
    pub rotation_angle: f64,
    /// Cover scale with flips folded into the sign.
    pub scale_factors: (f64, f64),
}

impl ImageTransform {
    pub fn new(extent: &CanvasExtent, transform: &TransformState) -> Self {
        Self {
            origin: extent.image_rect().center(),
            rotation_angle: transform.rotation_angle,
            scale_factors: transform.scale_factors(extent.width, extent.height),
        }
    }

    /// SVG/CSS `transform` attribute value.
    pub fn to_svg(&self) -> String {
        let Point { x, y } = self.origin;
        let (sx, sy) = self.scale_factors;
        format!(
            "translate({x} {y}) rotate({}) scale({sx} {sy}) translate({} {})",
            self.rotation_angle, -x, -y
        )
    }
}

/// Everything needed to draw the crop overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropView {
    /// The crop rectangle as drawn, after zoom placement.
    pub visible: Rect,
    pub zoom_factor: f64,
    pub grips: Vec<Grip>,
    pub grid: Vec<GridLine>,
    /// SVG path of the shade: the whole canvas with `visible` cut out.
    pub shade_path: String,
    pub shade_visible: bool,
    /// Placement of the image itself, before zoom.
    pub image: ImageTransform,
}

pub fn sync_view(
    controller: &CropController,
    transform: &TransformState,
    settings: &ViewSettings,
) -> CropView {
    let visible = controller.visible_rect();
    let outer = controller.extent().outer_size();

    let grips = Handle::ALL
        .iter()
        .map(|&handle| Grip {
            handle,
            center: handle.position(&visible),
        })
        .collect();

    let grid = if settings.grid_visible {
        grid_lines(&visible, settings.grid_lines)
    } else {
        Vec::new()
    };

    CropView {
        visible,
        zoom_factor: controller.zoom_factor(),
        grips,
        grid,
        shade_path: hollow_rect_path(outer.width, outer.height, &visible),
        shade_visible: settings.shade_visible,
        image: ImageTransform::new(&controller.extent(), transform),
    }
}

/// `count` evenly spaced vertical lines, then `count` horizontal ones.
pub fn grid_lines(rect: &Rect, count: u32) -> Vec<GridLine> {
    let divisions = count as f64 + 1.0;
    let x_step = rect.width / divisions;
    let y_step = rect.height / divisions;

    let vertical = (1..=count).map(|i| {
        let x = rect.x + x_step * i as f64;
        GridLine {
            from: Point::new(x, rect.y),
            to: Point::new(x, rect.bottom()),
        }
    });
    let horizontal = (1..=count).map(|i| {
        let y = rect.y + y_step * i as f64;
        GridLine {
            from: Point::new(rect.x, y),
            to: Point::new(rect.right(), y),
        }
    });
    vertical.chain(horizontal).collect()
}

/// Outer rectangle clockwise, hole counter-clockwise, so the hole stays
/// empty under both fill rules.
pub fn hollow_rect_path(outer_width: f64, outer_height: f64, hole: &Rect) -> String {
    format!(
        "M0,0 H{} V{} H0 Z M{},{} V{} H{} V{} Z",
        outer_width,
        outer_height,
        hole.x,
        hole.y,
        hole.bottom(),
        hole.right(),
        hole.y
    )
}
