//! Crop session orchestration.
//!
//! [`CropArea`] ties the pieces together for one editing session: it opens a
//! [`CropController`] on a canvas, owns the image [`TransformState`],
//! produces and restores [`CropAreaState`] snapshots, and sequences
//! rasterization so only one render is in flight at a time.
//!
//! # Rendering
//!
//! Rendering is split so the heavy part can run elsewhere (a worker, a
//! spawned task) while the session stays on the input thread:
//!
//! ```ignore
//! let request = area.begin_render(options)?;   // shade hidden, guard set
//! let result = request.run(&source);           // pure, Send
//! let image = area.finish_render(request, result)?;  // listeners notified
//! ```
//!
//! A result that arrives after [`CropArea::close`] is still returned to the
//! caller but no longer reaches the render listeners.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::aspect::AspectRatio;
use crate::controller::{Commit, CropController, CropObserver, ObserverId};
use crate::decode::SourceImage;
use crate::error::{RasterizeError, SessionError};
use crate::geometry::{CanvasExtent, HitTarget, Point, Rect, Size};
use crate::raster::{rasterize, CropGeometry, EncodedImage, RenderOptions};
use crate::state::CropAreaState;
use crate::transform::TransformState;
use crate::view::{sync_view, CropView, ViewSettings};

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropAreaOptions {
    /// Border around the image inside the edit canvas.
    pub margin: f64,
    /// Inset of the initial crop rectangle from the image edges; `0` selects
    /// the whole image.
    pub default_inset: f64,
    pub grid_lines: u32,
    pub grid_visible: bool,
    /// Open with zoom-to-crop enabled.
    pub zoom_to_crop: bool,
}

impl Default for CropAreaOptions {
    fn default() -> Self {
        Self {
            margin: 20.0,
            default_inset: 0.0,
            grid_lines: 2,
            grid_visible: true,
            zoom_to_crop: false,
        }
    }
}

pub type RenderListener = Box<dyn FnMut(&EncodedImage, &CropAreaState)>;
pub type CloseListener = Box<dyn FnMut()>;

/// A render started by [`CropArea::begin_render`].
///
/// Carries a copy of everything the rasterizer needs, so it can be moved to
/// another thread.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    geometry: CropGeometry,
    options: RenderOptions,
    state: CropAreaState,
    generation: u64,
}

impl RenderRequest {
    pub fn geometry(&self) -> &CropGeometry {
        &self.geometry
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Snapshot taken when the render started.
    pub fn state(&self) -> &CropAreaState {
        &self.state
    }

    /// Rasterize `source` with the captured geometry.
    pub fn run(&self, source: &SourceImage) -> Result<EncodedImage, RasterizeError> {
        rasterize(source, &self.geometry, &self.options)
    }
}

/// One crop editing session.
pub struct CropArea {
    options: CropAreaOptions,
    controller: Option<CropController>,
    transform: TransformState,
    render_in_flight: bool,
    generation: u64,
    render_listeners: Vec<RenderListener>,
    close_listeners: Vec<CloseListener>,
}

impl std::fmt::Debug for CropArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropArea")
            .field("options", &self.options)
            .field("controller", &self.controller)
            .field("transform", &self.transform)
            .field("render_in_flight", &self.render_in_flight)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for CropArea {
    fn default() -> Self {
        Self::new(CropAreaOptions::default())
    }
}

impl CropArea {
    pub fn new(options: CropAreaOptions) -> Self {
        Self {
            options,
            controller: None,
            transform: TransformState::default(),
            render_in_flight: false,
            generation: 0,
            render_listeners: Vec::new(),
            close_listeners: Vec::new(),
        }
    }

    pub fn options(&self) -> &CropAreaOptions {
        &self.options
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.options.grid_visible = visible;
    }

    pub fn set_grid_lines(&mut self, lines: u32) {
        self.options.grid_lines = lines;
    }

    /// Start a session on a canvas showing the image at `canvas` size.
    ///
    /// Any previous session is replaced without notifying close listeners.
    pub fn open(&mut self, canvas: Size) -> &mut CropController {
        let canvas = canvas.rounded();
        let extent = CanvasExtent::new(canvas.width, canvas.height, self.options.margin);
        self.generation += 1;
        self.render_in_flight = false;
        self.transform = TransformState::default();
        debug!("opening crop area on {}x{} canvas", extent.width, extent.height);

        let mut controller = CropController::open(extent, self.options.default_inset);
        if self.options.zoom_to_crop {
            controller.set_zoom_enabled(true);
        }
        self.controller.insert(controller)
    }

    /// Open with the image fitted into a container of `container` units,
    /// margins included, keeping the image's aspect ratio.
    pub fn open_in_container(&mut self, image: Size, container: Size) -> &mut CropController {
        let margin = self.options.margin;
        let available = Size::new(
            (container.width - 2.0 * margin).max(0.0),
            (container.height - 2.0 * margin).max(0.0),
        );
        self.open(CanvasExtent::fit_within(image, available))
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_some()
    }

    /// End the session and notify close listeners. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.controller.take().is_none() {
            return;
        }
        debug!("closing crop area");
        self.render_in_flight = false;
        for listener in self.close_listeners.iter_mut() {
            listener();
        }
    }

    pub fn controller(&self) -> Option<&CropController> {
        self.controller.as_ref()
    }

    fn open_controller(&self) -> Result<&CropController, SessionError> {
        self.controller.as_ref().ok_or(SessionError::NotOpen)
    }

    fn open_controller_mut(&mut self) -> Result<&mut CropController, SessionError> {
        self.controller.as_mut().ok_or(SessionError::NotOpen)
    }

    pub fn crop_rectangle(&self) -> Result<Rect, SessionError> {
        Ok(self.open_controller()?.crop_rectangle())
    }

    pub fn set_crop_rectangle(&mut self, rect: Rect) -> Result<Commit, SessionError> {
        Ok(self.open_controller_mut()?.set_crop_rectangle(rect))
    }

    pub fn aspect_ratio(&self) -> Result<AspectRatio, SessionError> {
        Ok(self.open_controller()?.aspect_ratio())
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) -> Result<Commit, SessionError> {
        Ok(self.open_controller_mut()?.set_aspect_ratio(ratio))
    }

    pub fn set_zoom_enabled(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.open_controller_mut()?.set_zoom_enabled(enabled);
        Ok(())
    }

    pub fn zoom_factor(&self) -> Result<f64, SessionError> {
        Ok(self.open_controller()?.zoom_factor())
    }

    /// Register a crop-rectangle observer for the current session.
    pub fn on_crop_rect_changed(&mut self, observer: CropObserver) -> Result<ObserverId, SessionError> {
        Ok(self.open_controller_mut()?.subscribe(observer))
    }

    pub fn pointer_down(&mut self, point: Point) -> Result<Option<HitTarget>, SessionError> {
        Ok(self.open_controller_mut()?.begin_session(point))
    }

    pub fn pointer_move(&mut self, point: Point) -> Result<Commit, SessionError> {
        Ok(self.open_controller_mut()?.on_move(point))
    }

    /// Pointer up or cancel. Ignored when closed.
    pub fn pointer_up(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.end_session();
        }
    }

    /// Follow a container resize; the new size is rounded to whole units.
    pub fn rescale_for_new_canvas(&mut self, canvas: Size) -> Result<Rect, SessionError> {
        Ok(self.open_controller_mut()?.rescale_for_new_canvas(canvas))
    }

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn rotate_to(&mut self, angle_degrees: f64) {
        self.transform.rotate_to(angle_degrees);
    }

    pub fn rotate_by(&mut self, delta_degrees: f64) {
        self.transform.rotate_by(delta_degrees);
    }

    pub fn rotate_left(&mut self) {
        self.transform.rotate_left();
    }

    pub fn rotate_right(&mut self) {
        self.transform.rotate_right();
    }

    pub fn flip_horizontally(&mut self) {
        self.transform.flip_horizontally();
    }

    pub fn flip_vertically(&mut self) {
        self.transform.flip_vertically();
    }

    pub fn straighten_by_drag(&mut self, pointer_dx: f64) {
        self.transform.straighten_by_drag(pointer_dx);
    }

    pub fn get_state(&self) -> Result<CropAreaState, SessionError> {
        let controller = self.open_controller()?;
        Ok(CropAreaState::new(
            controller.extent().size(),
            &self.transform,
            controller.crop_rectangle(),
        ))
    }

    /// Restore a snapshot, rescaling its rectangle if it was taken on a
    /// canvas of another size.
    pub fn restore_state(&mut self, state: &CropAreaState) -> Result<Rect, SessionError> {
        let controller = self.controller.as_mut().ok_or(SessionError::NotOpen)?;
        let extent = controller.extent();
        let rect = state.rescaled_rect(extent.size(), extent.margin);
        controller.set_crop_rectangle(rect);
        self.transform = state.transform();
        debug!(
            "restored crop state from {}x{} canvas onto {}x{}",
            state.width, state.height, extent.width, extent.height
        );
        Ok(controller.crop_rectangle())
    }

    pub fn is_rendering(&self) -> bool {
        self.render_in_flight
    }

    /// Drawable overlay for the current state. The shade is hidden while a
    /// render is in flight.
    pub fn view(&self) -> Result<CropView, SessionError> {
        let settings = ViewSettings {
            grid_lines: self.options.grid_lines,
            grid_visible: self.options.grid_visible,
            shade_visible: !self.render_in_flight,
        };
        Ok(sync_view(self.open_controller()?, &self.transform, &settings))
    }

    pub fn on_render(&mut self, listener: RenderListener) {
        self.render_listeners.push(listener);
    }

    pub fn on_close(&mut self, listener: CloseListener) {
        self.close_listeners.push(listener);
    }

    /// Start a render.
    ///
    /// # Errors
    ///
    /// `NotOpen` when closed, `RenderInProgress` when the previous render has
    /// not been finished.
    pub fn begin_render(&mut self, options: RenderOptions) -> Result<RenderRequest, SessionError> {
        let controller = self.open_controller()?;
        if self.render_in_flight {
            return Err(SessionError::RenderInProgress);
        }

        let extent = controller.extent();
        let crop_rect = controller.crop_rectangle();
        let request = RenderRequest {
            geometry: CropGeometry {
                extent,
                crop_rect,
                transform: self.transform,
            },
            options,
            state: CropAreaState::new(extent.size(), &self.transform, crop_rect),
            generation: self.generation,
        };
        self.render_in_flight = true;
        Ok(request)
    }

    /// Complete a render started with [`begin_render`](Self::begin_render).
    ///
    /// Clears the in-flight guard and, if the session is still the one that
    /// started the render, passes the image to the render listeners.
    pub fn finish_render(
        &mut self,
        request: RenderRequest,
        result: Result<EncodedImage, RasterizeError>,
    ) -> Result<EncodedImage, SessionError> {
        let current = self.is_open() && request.generation == self.generation;
        if current {
            self.render_in_flight = false;
        }

        let image = result?;
        if current {
            for listener in self.render_listeners.iter_mut() {
                listener(&image, &request.state);
            }
        } else {
            warn!("render finished after its crop area closed; listeners not notified");
        }
        Ok(image)
    }

    /// Begin, run and finish a render on the current thread.
    pub fn render(
        &mut self,
        source: &SourceImage,
        options: RenderOptions,
    ) -> Result<EncodedImage, SessionError> {
        let request = self.begin_render(options)?;
        let result = request.run(source);
        self.finish_render(request, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn opened() -> CropArea {
        let mut area = CropArea::default();
        area.open(Size::new(400.0, 300.0));
        area
    }

    fn source() -> SourceImage {
        SourceImage::new(800, 600, vec![90; 800 * 600 * 4]).unwrap()
    }

    #[test]
    fn test_open_defaults_to_full_image() {
        let area = opened();
        assert!(area.is_open());
        assert_eq!(area.crop_rectangle().unwrap(), Rect::new(20.0, 20.0, 400.0, 300.0));
        assert_eq!(area.zoom_factor().unwrap(), 1.0);
    }

    #[test]
    fn test_open_with_inset_and_zoom() {
        let mut area = CropArea::new(CropAreaOptions {
            default_inset: 50.0,
            zoom_to_crop: true,
            ..CropAreaOptions::default()
        });
        area.open(Size::new(400.0, 300.0));
        assert_eq!(area.crop_rectangle().unwrap(), Rect::new(70.0, 70.0, 300.0, 200.0));
        let zoom = area.zoom_factor().unwrap();
        assert!((zoom - 400.0 / 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_rounds_canvas() {
        let mut area = CropArea::default();
        area.open(Size::new(399.6, 300.2));
        assert_eq!(
            area.controller().map(|c| c.extent()),
            Some(CanvasExtent::new(400.0, 300.0, 20.0))
        );
    }

    #[test]
    fn test_closed_operations_fail() {
        let mut area = CropArea::default();
        assert!(matches!(area.crop_rectangle(), Err(SessionError::NotOpen)));
        assert!(matches!(
            area.begin_render(RenderOptions::default()),
            Err(SessionError::NotOpen)
        ));
        area.pointer_up();
    }

    #[test]
    fn test_close_notifies_once() {
        let mut area = opened();
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        area.on_close(Box::new(move || counter.set(counter.get() + 1)));

        area.close();
        area.close();
        assert_eq!(closes.get(), 1);
        assert!(!area.is_open());
    }

    #[test]
    fn test_pointer_drag_through_session() {
        let mut area = opened();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        area.on_crop_rect_changed(Box::new(move |r| sink.borrow_mut().push(*r)))
            .unwrap();

        area.set_crop_rectangle(Rect::new(70.0, 20.0, 200.0, 200.0)).unwrap();
        let target = area.pointer_down(Point::new(270.0, 220.0)).unwrap();
        assert!(matches!(target, Some(HitTarget::Handle(_))));
        let commit = area.pointer_move(Point::new(320.0, 250.0)).unwrap();
        area.pointer_up();

        assert_eq!(commit, Commit::Applied);
        assert_eq!(area.crop_rectangle().unwrap(), Rect::new(70.0, 20.0, 250.0, 230.0));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_state_round_trip_with_rescale() {
        let mut small = CropArea::default();
        small.open(Size::new(200.0, 200.0));
        small.set_crop_rectangle(Rect::new(20.0, 20.0, 100.0, 100.0)).unwrap();
        small.rotate_right();
        small.flip_vertically();
        let state = small.get_state().unwrap();
        assert_eq!((state.width, state.height), (200.0, 200.0));

        let mut large = CropArea::default();
        large.open(Size::new(400.0, 400.0));
        let rect = large.restore_state(&state).unwrap();
        assert_eq!(rect, Rect::new(20.0, 20.0, 200.0, 200.0));
        assert_eq!(large.transform().rotation_angle, 90.0);
        assert!(large.transform().flipped_vertically);
    }

    #[test]
    fn test_open_in_container_keeps_image_aspect() {
        let mut area = CropArea::default();
        area.open_in_container(Size::new(1200.0, 800.0), Size::new(640.0, 640.0));
        // 600x600 available; a 3:2 image fills the width
        assert_eq!(area.crop_rectangle().unwrap(), Rect::new(20.0, 20.0, 600.0, 400.0));
    }

    #[test]
    fn test_view_image_transform_matches_render_plan() {
        let mut area = opened();
        area.rotate_to(30.0);
        area.flip_horizontally();

        let view = area.view().unwrap();
        let request = area.begin_render(RenderOptions::natural()).unwrap();
        let plan = crate::raster::plan_render(
            request.geometry(),
            Size::new(800.0, 600.0),
            request.options(),
        )
        .unwrap();

        assert_eq!(view.image.scale_factors, plan.scale_factors);
        assert!(view.image.scale_factors.0 < -1.0);
        assert_eq!(view.image.rotation_angle, 30.0);
        assert_eq!(view.image.origin, Point::new(220.0, 170.0));
    }

    #[test]
    fn test_second_render_rejected_while_in_flight() {
        let mut area = opened();
        let request = area.begin_render(RenderOptions::default()).unwrap();
        assert!(area.is_rendering());
        assert!(!area.view().unwrap().shade_visible);
        assert!(matches!(
            area.begin_render(RenderOptions::default()),
            Err(SessionError::RenderInProgress)
        ));

        let result = request.run(&source());
        area.finish_render(request, result).unwrap();
        assert!(!area.is_rendering());
        assert!(area.view().unwrap().shade_visible);
        assert!(area.begin_render(RenderOptions::default()).is_ok());
    }

    #[test]
    fn test_render_notifies_listeners_with_state() {
        let mut area = opened();
        area.set_aspect_ratio(AspectRatio::new(1.0, 1.0)).unwrap();
        area.rotate_to(5.0);

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        area.on_render(Box::new(move |image, state| {
            *sink.borrow_mut() = Some(((image.width, image.height), *state));
        }));

        let options = RenderOptions {
            natural_size: true,
            ..RenderOptions::default()
        };
        let image = area.render(&source(), options).unwrap();

        // 800x600 source on a 400x300 canvas, cover scale for 5 degrees
        let x_scale = 800.0 / 400.0 / area.transform().cover_scale(400.0, 300.0);
        let expected = (300.0 * x_scale).round() as u32;
        assert_eq!((image.width, image.height), (expected, expected));

        let recorded = *seen.borrow();
        let (size, state) = recorded.expect("listener called");
        assert_eq!(size, (image.width, image.height));
        assert_eq!(state.crop_rect, Rect::new(70.0, 20.0, 300.0, 300.0));
        assert_eq!(state.rotation_angle, 5.0);
    }

    #[test]
    fn test_render_after_close_still_delivered() {
        let mut area = opened();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        area.on_render(Box::new(move |_, _| counter.set(counter.get() + 1)));

        let request = area.begin_render(RenderOptions::default()).unwrap();
        area.close();
        let result = request.run(&source());
        let image = area.finish_render(request, result).unwrap();

        assert_eq!((image.width, image.height), (400, 300));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_stale_render_does_not_clear_new_guard() {
        let mut area = opened();
        let stale = area.begin_render(RenderOptions::default()).unwrap();
        area.open(Size::new(400.0, 300.0));
        let _fresh = area.begin_render(RenderOptions::default()).unwrap();

        let result = stale.run(&source());
        area.finish_render(stale, result).unwrap();
        assert!(area.is_rendering());
    }

    #[test]
    fn test_failed_render_clears_guard() {
        let mut area = opened();
        let empty = SourceImage::new(0, 0, Vec::new()).unwrap();
        assert!(matches!(
            area.render(&empty, RenderOptions::default()),
            Err(SessionError::Rasterize(RasterizeError::EmptySource))
        ));
        assert!(!area.is_rendering());
    }

    #[test]
    fn test_rescale_for_new_canvas() {
        let mut area = CropArea::default();
        area.open(Size::new(200.0, 200.0));
        area.set_crop_rectangle(Rect::new(20.0, 20.0, 100.0, 100.0)).unwrap();
        let rect = area.rescale_for_new_canvas(Size::new(400.2, 399.8)).unwrap();
        assert_eq!(rect, Rect::new(20.0, 20.0, 200.0, 200.0));
    }

    #[test]
    fn test_render_request_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RenderRequest>();
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CropAreaOptions = serde_json::from_str(r#"{"margin": 10}"#).unwrap();
        assert_eq!(options.margin, 10.0);
        assert_eq!(options.grid_lines, 2);
        assert!(options.grid_visible);
    }
}
