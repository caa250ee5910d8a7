//! Cropframe Core - interactive crop geometry and rasterization
//!
//! This crate provides the platform-independent part of an image crop
//! editor: the crop-rectangle controller that turns pointer gestures into a
//! valid rectangle, aspect-ratio constraints, zoom-to-crop placement, canvas
//! rescaling, and the pipeline that renders the final crop from the source
//! image at full resolution.
//!
//! # Coordinate System
//!
//! All geometry is in edit-canvas units. The canvas is the displayed image
//! plus a fixed margin on every side, so the image itself spans
//! `[margin, margin + width] x [margin, margin + height]`.
//!
//! The crate never draws. After each committed change callers run
//! [`view::sync_view`] and redraw from the result.

pub mod aspect;
pub mod controller;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod rescale;
pub mod session;
pub mod state;
pub mod transform;
pub mod view;
pub mod zoom;

pub use aspect::{adjust_to_ratio, horizontal_length, vertical_length, AspectRatio};
pub use controller::{Commit, CropController, InteractionSession, ObserverId, SessionKind};
pub use decode::{decode_source, SourceImage};
pub use error::{DecodeError, EncodeError, RasterizeError, SessionError};
pub use geometry::{
    hit_test_target, CanvasExtent, Handle, HitTarget, Point, Rect, Size, GRIP_SIZE, MIN_SIZE,
};
pub use raster::{rasterize, CropGeometry, EncodedImage, ImageFormat, RenderOptions};
pub use rescale::rescale;
pub use session::{CropArea, CropAreaOptions, RenderRequest};
pub use state::CropAreaState;
pub use transform::{normalize_angle, TransformState};
pub use view::{sync_view, CropView, ImageTransform, ViewSettings};
pub use zoom::{compute_zoom, ZoomState};
