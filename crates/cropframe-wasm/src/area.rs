//! WASM bindings for an interactive crop session.
//!
//! [`JsCropArea`] wraps the core `CropArea`. Geometry crosses the boundary
//! as plain objects via `serde-wasm-bindgen` (`{x, y, width, height}` for
//! rectangles, the `CropAreaState` shape for snapshots).
//!
//! JavaScript callbacks are invoked only after the session borrow is
//! released, so a callback may call back into the same `JsCropArea`.
//!
//! # Example
//!
//! ```typescript
//! const area = new JsCropArea({ margin: 20 });
//! area.open(img.width, img.height);
//! area.set_on_change((rect) => redraw(area.view()));
//!
//! svg.onpointerdown = (e) => area.pointer_down(e.offsetX, e.offsetY);
//! svg.onpointermove = (e) => area.pointer_move(e.offsetX, e.offsetY);
//! svg.onpointerup = () => area.pointer_up();
//!
//! const result = await area.rasterize(source, { naturalSize: true, imageType: 'image/jpeg' });
//! preview.src = result.to_data_url();
//! ```

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use cropframe_core::raster::RenderOptions;
use cropframe_core::{AspectRatio, CropArea, CropAreaOptions, CropAreaState, Point, Rect, SessionError, Size};
use js_sys::{Function, Promise};
use log::warn;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::types::{format_from_mime, JsEncodedImage, JsSourceImage};

fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Render options as passed from JavaScript.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JsRenderOptions {
    natural_size: bool,
    width: Option<u32>,
    height: Option<u32>,
    max_pixel_area: Option<u64>,
    /// MIME type, `image/png` when absent.
    image_type: Option<String>,
    /// Lossy quality in `0..=1`.
    image_quality: Option<f64>,
}

impl JsRenderOptions {
    fn into_render_options(self) -> Result<RenderOptions, JsValue> {
        let format = match self.image_type.as_deref() {
            Some(mime) => format_from_mime(mime)?,
            None => Default::default(),
        };
        Ok(RenderOptions {
            natural_size: self.natural_size,
            width: self.width,
            height: self.height,
            max_pixel_area: self.max_pixel_area,
            format,
            quality: self.image_quality,
        })
    }
}

/// One crop editing session.
#[wasm_bindgen]
pub struct JsCropArea {
    inner: Rc<RefCell<CropArea>>,
    on_change: Option<Function>,
    on_close: Option<Function>,
}

#[wasm_bindgen]
impl JsCropArea {
    /// Create a crop area. `options` may be omitted for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsCropArea, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            CropAreaOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js)?
        };
        Ok(Self::with_options(options))
    }

    /// Start a session on a canvas showing the image at `width x height`.
    pub fn open(&mut self, width: f64, height: f64) {
        self.inner.borrow_mut().open(Size::new(width, height));
    }

    /// Start a session with the image fitted into a container, margins
    /// included. Returns the canvas size as `{width, height}`.
    pub fn open_in_container(
        &mut self,
        image_width: f64,
        image_height: f64,
        container_width: f64,
        container_height: f64,
    ) -> Result<JsValue, JsValue> {
        let size = self.fit_in_container(
            Size::new(image_width, image_height),
            Size::new(container_width, container_height),
        );
        serde_wasm_bindgen::to_value(&size).map_err(to_js)
    }

    /// End the session. Calls the close callback once.
    pub fn close(&mut self) -> Result<(), JsValue> {
        let was_open = {
            let mut area = self.inner.borrow_mut();
            let was_open = area.is_open();
            area.close();
            was_open
        };
        if let (true, Some(callback)) = (was_open, &self.on_close) {
            callback.call0(&JsValue::NULL)?;
        }
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn is_open(&self) -> bool {
        self.inner.borrow().is_open()
    }

    /// Called with the new rectangle after every committed change.
    pub fn set_on_change(&mut self, callback: Option<Function>) {
        self.on_change = callback;
    }

    pub fn set_on_close(&mut self, callback: Option<Function>) {
        self.on_close = callback;
    }

    /// Pointer down at canvas coordinates. Returns whether a gesture started.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        let target = self
            .inner
            .borrow_mut()
            .pointer_down(Point::new(x, y))
            .map_err(to_js)?;
        Ok(target.is_some())
    }

    /// Pointer move. Returns whether the rectangle changed.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.mutate(|area| area.pointer_move(Point::new(x, y)).map(drop))
    }

    /// Pointer up or cancel.
    pub fn pointer_up(&mut self) {
        self.inner.borrow_mut().pointer_up();
    }

    pub fn crop_rectangle(&self) -> Result<JsValue, JsValue> {
        let rect = self.inner.borrow().crop_rectangle().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&rect).map_err(to_js)
    }

    pub fn set_crop_rectangle(&mut self, rect: JsValue) -> Result<bool, JsValue> {
        let rect: Rect = serde_wasm_bindgen::from_value(rect).map_err(to_js)?;
        self.mutate(|area| area.set_crop_rectangle(rect).map(drop))
    }

    /// `0, 0` selects free-form.
    pub fn set_aspect_ratio(&mut self, horizontal: f64, vertical: f64) -> Result<bool, JsValue> {
        let ratio = AspectRatio::new(horizontal, vertical);
        self.mutate(|area| area.set_aspect_ratio(ratio).map(drop))
    }

    pub fn aspect_ratio(&self) -> Result<JsValue, JsValue> {
        let ratio = self.inner.borrow().aspect_ratio().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&ratio).map_err(to_js)
    }

    pub fn set_zoom_enabled(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.inner.borrow_mut().set_zoom_enabled(enabled).map_err(to_js)
    }

    pub fn zoom_factor(&self) -> Result<f64, JsValue> {
        self.inner.borrow().zoom_factor().map_err(to_js)
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.inner.borrow_mut().set_grid_visible(visible);
    }

    /// Number of alignment lines per axis.
    pub fn set_grid_lines(&mut self, lines: u32) {
        self.inner.borrow_mut().set_grid_lines(lines);
    }

    /// Follow a container resize. Returns the rescaled rectangle.
    pub fn rescale_for_new_canvas(&mut self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        self.mutate(|area| area.rescale_for_new_canvas(Size::new(width, height)).map(drop))?;
        self.crop_rectangle()
    }

    pub fn rotate_to(&mut self, angle_degrees: f64) {
        self.inner.borrow_mut().rotate_to(angle_degrees);
    }

    pub fn rotate_left(&mut self) {
        self.inner.borrow_mut().rotate_left();
    }

    pub fn rotate_right(&mut self) {
        self.inner.borrow_mut().rotate_right();
    }

    pub fn flip_horizontally(&mut self) {
        self.inner.borrow_mut().flip_horizontally();
    }

    pub fn flip_vertically(&mut self) {
        self.inner.borrow_mut().flip_vertically();
    }

    /// Straighten from a horizontal drag of `dx` pixels.
    pub fn straighten_by_drag(&mut self, dx: f64) {
        self.inner.borrow_mut().straighten_by_drag(dx);
    }

    #[wasm_bindgen(getter)]
    pub fn rotation_angle(&self) -> f64 {
        self.inner.borrow().transform().rotation_angle
    }

    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let state = self.inner.borrow().get_state().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&state).map_err(to_js)
    }

    pub fn restore_state(&mut self, state: JsValue) -> Result<bool, JsValue> {
        let state: CropAreaState = serde_wasm_bindgen::from_value(state).map_err(to_js)?;
        self.mutate(|area| area.restore_state(&state).map(drop))
    }

    /// Drawable overlay: visible rectangle, grips, grid lines, shade path.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = self.inner.borrow().view().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&view).map_err(to_js)
    }

    /// SVG `transform` for the image element, so the preview matches the
    /// rendered output.
    pub fn image_transform(&self) -> Result<String, JsValue> {
        let view = self.inner.borrow().view().map_err(to_js)?;
        Ok(view.image.to_svg())
    }

    #[wasm_bindgen(getter)]
    pub fn is_rendering(&self) -> bool {
        self.inner.borrow().is_rendering()
    }

    /// Render the crop from `source`. Resolves to a `JsEncodedImage`.
    ///
    /// Fails immediately if the area is closed or a render is in flight.
    pub fn rasterize(&mut self, source: &JsSourceImage, options: JsValue) -> Result<Promise, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            JsRenderOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js)?
        };
        let options = options.into_render_options()?;

        let request = self.inner.borrow_mut().begin_render(options).map_err(to_js)?;
        let source = source.source().clone();
        let inner = Rc::clone(&self.inner);

        Ok(future_to_promise(async move {
            if let Err(err) = JsFuture::from(next_task()).await {
                warn!("render did not yield before running: {err:?}");
            }

            let result = request.run(&source);
            let image = inner
                .borrow_mut()
                .finish_render(request, result)
                .map_err(to_js)?;
            Ok(JsEncodedImage::from_encoded(image).into())
        }))
    }
}

impl JsCropArea {
    pub(crate) fn with_options(options: CropAreaOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CropArea::new(options))),
            on_change: None,
            on_close: None,
        }
    }

    fn fit_in_container(&mut self, image: Size, container: Size) -> Size {
        self.inner
            .borrow_mut()
            .open_in_container(image, container)
            .extent()
            .size()
    }

    /// Run a rectangle mutation, then fire the change callback if the
    /// rectangle actually changed.
    fn mutate<F>(&mut self, f: F) -> Result<bool, JsValue>
    where
        F: FnOnce(&mut CropArea) -> Result<(), SessionError>,
    {
        let (before, after) = {
            let mut area = self.inner.borrow_mut();
            let before = area.crop_rectangle().ok();
            f(&mut *area).map_err(to_js)?;
            (before, area.crop_rectangle().ok())
        };

        let changed = before != after;
        if let (true, Some(rect), Some(callback)) = (changed, after, &self.on_change) {
            let value = serde_wasm_bindgen::to_value(&rect).map_err(to_js)?;
            callback.call1(&JsValue::NULL, &value)?;
        }
        Ok(changed)
    }
}

/// Resolves from a timer task. The browser may repaint before timer tasks,
/// which a microtask never allows, so the hidden shade reaches the screen
/// while the render runs.
fn next_task() -> Promise {
    Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().is_some_and(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
                .is_ok()
        });
        if !scheduled {
            // No window, e.g. inside a worker
            if let Err(err) = resolve.call0(&JsValue::UNDEFINED) {
                warn!("could not resume render: {err:?}");
            }
        }
    })
}

/// Aspect ratios offered by the toolbar, free-form first.
#[wasm_bindgen]
pub fn aspect_ratio_presets() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&AspectRatio::PRESETS).map_err(to_js)
}
