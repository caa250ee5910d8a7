//! Interactive crop-rectangle controller.
//!
//! The controller owns the crop rectangle and the state of the current
//! pointer gesture. It consumes pointer positions in edit-canvas coordinates,
//! keeps the rectangle valid (inside the canvas, at least [`MIN_SIZE`] on
//! each side, matching the active aspect ratio) and notifies observers after
//! every committed change. It never draws anything; callers render from
//! [`crate::view::sync_view`].
//!
//! # Gestures
//!
//! ```text
//! Idle --pointer down on body--> Moving   --pointer up--> Idle
//! Idle --pointer down on grip--> Resizing --pointer up--> Idle
//! ```
//!
//! Only one gesture is tracked at a time; a new pointer-down replaces it.

use std::fmt;

use log::{debug, trace};

use crate::aspect::{adjust_to_ratio, AspectRatio};
use crate::geometry::{hit_test_target, CanvasExtent, Handle, HitTarget, Point, Rect, Size, MIN_SIZE};
use crate::rescale::rescale;
use crate::zoom::ZoomState;

/// Callback invoked with the crop rectangle after each committed change.
pub type CropObserver = Box<dyn FnMut(&Rect)>;

/// Handle returned by [`CropController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// What the active gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Moving,
    Resizing(Handle),
}

/// State of one pointer gesture, from pointer-down to pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSession {
    kind: SessionKind,
    previous_point: Point,
}

impl InteractionSession {
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn previous_point(&self) -> Point {
        self.previous_point
    }

    pub fn is_moving(&self) -> bool {
        self.kind == SessionKind::Moving
    }

    pub fn active_handle(&self) -> Option<Handle> {
        match self.kind {
            SessionKind::Resizing(handle) => Some(handle),
            SessionKind::Moving => None,
        }
    }
}

/// Outcome of a mutation request.
///
/// `Clamped` is the non-fatal "geometry clamped" case: the request was
/// corrected to the nearest valid rectangle and committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Committed as requested.
    Applied,
    /// Corrected to stay valid, then committed.
    Clamped,
    /// The candidate left the canvas; the previous rectangle is kept.
    Rejected,
    /// Nothing to do: no active gesture or no change.
    Unchanged,
}

/// Owner of the crop rectangle and the active gesture.
pub struct CropController {
    extent: CanvasExtent,
    rect: Rect,
    aspect_ratio: AspectRatio,
    zoom: ZoomState,
    session: Option<InteractionSession>,
    observers: Vec<(ObserverId, CropObserver)>,
    next_observer: usize,
}

impl fmt::Debug for CropController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropController")
            .field("extent", &self.extent)
            .field("rect", &self.rect)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("zoom", &self.zoom)
            .field("session", &self.session)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CropController {
    /// Create a controller with an explicit starting rectangle.
    ///
    /// The rectangle is fitted into the canvas.
    pub fn new(extent: CanvasExtent, rect: Rect) -> Self {
        let mut controller = Self {
            extent,
            rect,
            aspect_ratio: AspectRatio::FREE,
            zoom: ZoomState::default(),
            session: None,
            observers: Vec::new(),
            next_observer: 0,
        };
        controller.rect = controller.fit_to_canvas(&rect).0;
        controller
    }

    /// Create a controller whose rectangle covers the image, inset by
    /// `inset` on every side (`0` selects the whole image).
    pub fn open(extent: CanvasExtent, inset: f64) -> Self {
        Self::new(extent, extent.image_rect().inset(inset))
    }

    pub fn extent(&self) -> CanvasExtent {
        self.extent
    }

    pub fn crop_rectangle(&self) -> Rect {
        self.rect
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom.zoom_factor
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    /// Where the crop rectangle is drawn on screen.
    pub fn visible_rect(&self) -> Rect {
        self.zoom.visible_rect(&self.rect, &self.extent)
    }

    /// Register a change observer.
    pub fn subscribe(&mut self, observer: CropObserver) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Replace the crop rectangle, fitting it into the canvas.
    pub fn set_crop_rectangle(&mut self, rect: Rect) -> Commit {
        let (fitted, clamped) = self.fit_to_canvas(&rect);
        self.commit(fitted, clamped)
    }

    /// Set the active aspect ratio and fit the rectangle to it.
    ///
    /// Unusable ratios (non-positive or non-finite sides) select free-form.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) -> Commit {
        let ratio = ratio.constraint().unwrap_or(AspectRatio::FREE);
        self.aspect_ratio = ratio;
        let adjusted = adjust_to_ratio(&self.rect, &ratio, &self.extent);
        let (fitted, clamped) = self.fit_to_canvas(&adjusted);
        self.commit(fitted, clamped)
    }

    /// Toggle zoom-to-crop. The crop rectangle itself does not change.
    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        if enabled {
            self.zoom.enable(&self.rect, &self.extent);
        } else {
            self.zoom.unzoom();
        }
        debug!(
            "zoom-to-crop {} (factor {})",
            if enabled { "enabled" } else { "disabled" },
            self.zoom.zoom_factor
        );
    }

    /// Move to a new canvas size, scaling the rectangle with it.
    ///
    /// The new size is rounded to whole units first.
    pub fn rescale_for_new_canvas(&mut self, new_size: Size) -> Rect {
        let new_size = new_size.rounded();
        let rect = rescale(self.extent.size(), new_size, &self.rect, self.extent.margin);
        self.extent = self.extent.with_size(new_size);
        self.set_crop_rectangle(rect);
        self.zoom.refresh(&self.rect, &self.extent);
        self.rect
    }

    /// Start a gesture at `point`, resolving the target by hit-testing the
    /// visible rectangle.
    ///
    /// Returns the target, or `None` (and no gesture) if the point missed.
    pub fn begin_session(&mut self, point: Point) -> Option<HitTarget> {
        match hit_test_target(&self.visible_rect(), point) {
            Some(target) => {
                self.begin_session_on(point, target);
                Some(target)
            }
            None => {
                self.session = None;
                None
            }
        }
    }

    /// Start a gesture on a target the caller already resolved.
    pub fn begin_session_on(&mut self, point: Point, target: HitTarget) {
        let kind = match target {
            HitTarget::Body => SessionKind::Moving,
            HitTarget::Handle(handle) => SessionKind::Resizing(handle),
        };
        trace!("begin {kind:?} at {point:?}");
        self.session = Some(InteractionSession {
            kind,
            previous_point: point,
        });
    }

    /// Feed a pointer position to the active gesture.
    pub fn on_move(&mut self, point: Point) -> Commit {
        let Some(session) = self.session else {
            return Commit::Unchanged;
        };

        let (candidate, clamped) = match session.kind {
            SessionKind::Moving => self.moved(session.previous_point, point),
            SessionKind::Resizing(handle) => self.resized(handle, session.previous_point, point),
        };

        // Track the pointer even when the candidate is rejected so the next
        // delta does not include the rejected travel.
        if let Some(active) = self.session.as_mut() {
            active.previous_point = point;
        }

        if self.within_canvas(&candidate) {
            self.commit(candidate, clamped)
        } else {
            trace!("rejected out-of-canvas candidate {candidate:?}");
            Commit::Rejected
        }
    }

    /// Finish the active gesture.
    pub fn end_session(&mut self) {
        self.session = None;
    }

    fn moved(&self, previous: Point, point: Point) -> (Rect, bool) {
        let mut dx = point.x - previous.x;
        let mut dy = point.y - previous.y;

        // Magnified view: dragging pans the image under a fixed frame
        if self.zoom.enabled {
            dx = -dx / self.zoom.zoom_factor;
            dy = -dy / self.zoom.zoom_factor;
        }

        let e = &self.extent;
        let wanted_x = self.rect.x + dx;
        let wanted_y = self.rect.y + dy;
        let x = wanted_x.max(e.margin).min(e.margin + e.width - self.rect.width);
        let y = wanted_y.max(e.margin).min(e.margin + e.height - self.rect.height);

        let clamped = x != wanted_x || y != wanted_y;
        (Rect::new(x, y, self.rect.width, self.rect.height), clamped)
    }

    fn resized(&self, handle: Handle, previous: Point, point: Point) -> (Rect, bool) {
        let e = &self.extent;
        let old = self.rect;
        let mut new = old;
        let mut clamped = false;

        let mut dx = point.x - previous.x;
        let mut dy = point.y - previous.y;
        let max_width = e.width * self.zoom.zoom_factor;
        let max_height = e.height * self.zoom.zoom_factor;

        if handle.is_left() {
            if old.x + dx < e.margin {
                dx = e.margin - old.x;
                clamped = true;
            }
            new.x = old.x + dx;
            new.width = old.right() - new.x;
        } else {
            if old.width + dx > max_width {
                dx = max_width - old.width;
                clamped = true;
            }
            new.width = old.width + dx;
        }

        match self.aspect_ratio.constraint() {
            Some(ratio) => {
                // The corner opposite the grip stays put; height follows width.
                let min_width = ratio.min_width();
                if new.width < min_width {
                    new.width = min_width;
                    if handle.is_left() {
                        new.x = old.right() - min_width;
                    }
                    clamped = true;
                }
                new.height = ratio.vertical_length(new.width);
                if handle.is_top() {
                    new.y = old.bottom() - new.height;
                }
            }
            None => {
                if handle.is_top() {
                    if old.y + dy < e.margin {
                        dy = e.margin - old.y;
                        clamped = true;
                    }
                    new.y = old.y + dy;
                    new.height = old.bottom() - new.y;
                } else {
                    if old.height + dy > max_height {
                        dy = max_height - old.height;
                        clamped = true;
                    }
                    new.height = old.height + dy;
                }
            }
        }

        if new.width < MIN_SIZE {
            new.width = MIN_SIZE;
            new.x = if handle.is_left() {
                old.right() - MIN_SIZE
            } else {
                old.x
            };
            clamped = true;
        }
        if new.height < MIN_SIZE {
            new.height = MIN_SIZE;
            new.y = if handle.is_top() {
                old.bottom() - MIN_SIZE
            } else {
                old.y
            };
            clamped = true;
        }

        (new, clamped)
    }

    /// Canvas bounds test with a one unit tolerance on the far edges.
    fn within_canvas(&self, rect: &Rect) -> bool {
        let e = &self.extent;
        rect.x >= e.margin
            && rect.y >= e.margin
            && (rect.x - e.margin + rect.width).floor() <= e.width.ceil()
            && (rect.y - e.margin + rect.height).floor() <= e.height.ceil()
    }

    /// Clamp size to `[MIN_SIZE, canvas]` and position into the canvas.
    fn fit_to_canvas(&self, rect: &Rect) -> (Rect, bool) {
        let e = &self.extent;
        let width = rect.width.min(e.width).max(MIN_SIZE);
        let height = rect.height.min(e.height).max(MIN_SIZE);
        let x = rect.x.min(e.margin + e.width - width).max(e.margin);
        let y = rect.y.min(e.margin + e.height - height).max(e.margin);
        let fitted = Rect::new(x, y, width, height);
        (fitted, fitted != *rect)
    }

    fn commit(&mut self, rect: Rect, clamped: bool) -> Commit {
        if clamped {
            debug!("crop rectangle clamped to {rect:?}");
        }
        if rect == self.rect {
            return if clamped {
                Commit::Clamped
            } else {
                Commit::Unchanged
            };
        }

        self.rect = rect;
        self.zoom.refresh(&self.rect, &self.extent);
        trace!("crop rectangle committed: {rect:?}");

        for (_, observer) in self.observers.iter_mut() {
            observer(&rect);
        }

        if clamped {
            Commit::Clamped
        } else {
            Commit::Applied
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
