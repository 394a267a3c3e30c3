//! Leptos component wrapping the skills graph canvas.
//!
//! The component sizes a canvas to its parent, builds the per-instance
//! [`SkillsGraphState`] from the `skills` signal and drives it from a
//! `requestAnimationFrame` loop. Pointer events pin and release nodes;
//! window resize and page visibility are observed through listener handles.
//! Everything registered here is released when the component unmounts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, PointerEvent};

use crate::log_dom_failure;

use super::config::GraphConfig;
use super::postprocess::{LensBlur, LensParams, Passthrough, PostProcess};
use super::render;
use super::state::SkillsGraphState;
use super::style::estimate_text_width;
use super::theme::ColorMode;
use super::ticker::{FrameTicker, ListenerHandle, is_document_hidden};
use super::types::SkillEntry;
use super::viewport::Viewport;

const FALLBACK_WIDTH: f64 = 800.0;
const MAX_FRAME_SECONDS: f64 = 0.1;

/// Drawing targets for one canvas. The renderer always draws into `ctx`;
/// an active lens filters that frame and is composited back over it.
struct Surfaces {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	post: Box<dyn PostProcess>,
	dpr: f64,
}

impl Surfaces {
	fn create(canvas: &HtmlCanvasElement) -> Option<Self> {
		let document = web_sys::window()?.document()?;
		let post: Box<dyn PostProcess> = match LensBlur::new(&document) {
			Ok(lens) => Box::new(lens),
			Err(e) => {
				warn!("skills-graph: lens unavailable, drawing unfiltered: {e:#}");
				Box::new(Passthrough)
			}
		};

		let ctx = match canvas.get_context("2d") {
			Ok(Some(obj)) => obj.dyn_into::<CanvasRenderingContext2d>().ok()?,
			_ => {
				warn!("skills-graph: no 2d canvas context");
				return None;
			}
		};
		debug!("skills-graph: drawing with {}", post.name());

		Some(Self {
			canvas: canvas.clone(),
			ctx,
			post,
			dpr: 1.0,
		})
	}

	fn lens_active(&self) -> bool {
		self.post.is_active()
	}

	/// Sizes the backing store for the device pixel ratio.
	fn resize(&mut self, viewport: &Viewport) {
		let dpr = web_sys::window()
			.map(|w| w.device_pixel_ratio())
			.filter(|d| *d > 0.0)
			.unwrap_or(1.0);
		let (pw, ph) = (
			(viewport.width * dpr).round().max(1.0) as u32,
			(viewport.height * dpr).round().max(1.0) as u32,
		);
		self.canvas.set_width(pw);
		self.canvas.set_height(ph);
		let style = web_sys::HtmlElement::style(&self.canvas);
		for (property, px) in [("width", viewport.width), ("height", viewport.height)] {
			log_dom_failure(
				style.set_property(property, &format!("{px}px")),
				"sizing the canvas",
			);
		}
		self.dpr = dpr;
	}

	/// Label width in the given CSS font, measured by the canvas.
	fn measure(&self, label: &str, font: &str) -> f64 {
		self.ctx.set_font(font);
		self.ctx
			.measure_text(label)
			.map(|m| m.width())
			.unwrap_or_else(|_| estimate_text_width(label, font))
	}
}

/// Simulation state plus the surfaces it is drawn on.
struct GraphContext {
	state: Option<SkillsGraphState>,
	surfaces: Surfaces,
	last_frame: Cell<Option<f64>>,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

impl GraphContext {
	fn frame(&mut self, timestamp: f64) {
		let dt = self
			.last_frame
			.replace(Some(timestamp))
			.map(|prev| ((timestamp - prev) / 1000.0).clamp(0.0, MAX_FRAME_SECONDS))
			.unwrap_or(1.0 / 60.0);
		let Some(state) = self.state.as_mut() else {
			return;
		};
		if !state.tick(dt) {
			return;
		}

		let s = &mut self.surfaces;
		render::render(state, &s.ctx, s.dpr);
		let params = LensParams::from_frame(
			state.sim.energy(),
			state.pointer,
			state.viewport.width,
			state.viewport.height,
			s.dpr,
			state.elapsed,
		);
		if let Some(filtered) = s.post.apply(&s.canvas, &params) {
			composite(&s.ctx, filtered);
		}
	}
}

/// Copies the filtered frame over the rendered one, pixel for pixel.
fn composite(ctx: &CanvasRenderingContext2d, filtered: &HtmlCanvasElement) {
	let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
	log_dom_failure(
		ctx.draw_image_with_html_canvas_element(filtered, 0.0, 0.0),
		"lens composite",
	);
}

/// Render loop and listeners of one mounted graph. Dropping it stops the
/// loop and removes every listener.
struct Teardown {
	_ticker: Option<FrameTicker>,
	_listeners: Vec<ListenerHandle>,
	context: SharedContext,
}

impl Drop for Teardown {
	fn drop(&mut self) {
		// Surfaces own the lens listeners, so they go with the state.
		if let Ok(mut ctx) = self.context.try_borrow_mut() {
			*ctx = None;
		}
		debug!("skills-graph: torn down");
	}
}

fn viewport_for(canvas: &HtmlCanvasElement, height: f64, reserved_left: f64) -> Viewport {
	let width = canvas
		.parent_element()
		.map(|p| f64::from(p.client_width()))
		.filter(|w| *w > 0.0)
		.unwrap_or(FALLBACK_WIDTH);
	Viewport::new(width, height, reserved_left)
}

fn local_point(element: &Element, ev: &PointerEvent) -> (f64, f64) {
	let rect = element.get_bounding_client_rect();
	(
		f64::from(ev.client_x()) - rect.left(),
		f64::from(ev.client_y()) - rect.top(),
	)
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	log_dom_failure(web_sys::HtmlElement::style(canvas).set_property("cursor", cursor), "setting cursor");
}

/// Renders the animated skills taxonomy on a canvas.
///
/// `skills` feeds the tree; changing it rebuilds the simulation. The
/// `color_mode` signal only swaps the palette. `reserved_width` is the width
/// on the left covered by page chrome, which the camera keeps clear.
#[component]
pub fn SkillsGraphCanvas(
	#[prop(into)] skills: Signal<Vec<SkillEntry>>,
	#[prop(into, default = "Skills".to_string())] root_label: String,
	#[prop(into, default = Signal::stored(ColorMode::default()))] color_mode: Signal<ColorMode>,
	#[prop(default = 0.0)] reserved_width: f64,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = None)] config: Option<GraphConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = match config.map(|c| c.validate().map(|()| c)) {
		Some(Ok(config)) => config,
		Some(Err(e)) => {
			warn!("skills-graph: {e}, using defaults");
			GraphConfig::default()
		}
		None => GraphConfig::default(),
	};
	let height = height.filter(|h| *h > 0.0).unwrap_or(config.height);
	let context: SharedContext = Rc::new(RefCell::new(None));
	let teardown = StoredValue::new_local(None::<Teardown>);

	let context_init = context.clone();
	Effect::new(move |_| {
		let entries = skills.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		// Dropping the previous teardown stops its loop before rebuilding.
		teardown.set_value(None);

		let Some(surfaces) = Surfaces::create(&canvas) else {
			return;
		};
		let mut slot = context_init.borrow_mut();
		let ctx = slot.insert(GraphContext {
			state: None,
			surfaces,
			last_frame: Cell::new(None),
		});

		let viewport = viewport_for(&canvas, height, reserved_width);
		ctx.surfaces.resize(&viewport);
		let surfaces = &ctx.surfaces;
		let state = SkillsGraphState::new(
			&entries,
			&root_label,
			&config,
			viewport,
			color_mode.get_untracked(),
			|label, font| surfaces.measure(label, font),
		);
		let mut state = match state {
			Ok(state) => state,
			Err(e) => {
				warn!("skills-graph: {e}");
				return;
			}
		};
		state.set_visible(!is_document_hidden());
		ctx.state = Some(state);
		drop(slot);

		let mut listeners = Vec::new();
		if let Some(window) = web_sys::window() {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			listeners.extend(ListenerHandle::new(&window, "resize", move |_| {
				let viewport = viewport_for(&canvas_resize, height, reserved_width);
				if let Some(c) = context_resize.borrow_mut().as_mut() {
					c.surfaces.resize(&viewport);
					if let Some(state) = c.state.as_mut() {
						state.resize(viewport);
					}
				}
			}));

			if let Some(document) = window.document() {
				let context_vis = context_init.clone();
				listeners.extend(ListenerHandle::new(
					&document,
					"visibilitychange",
					move |_| {
						let visible = !is_document_hidden();
						if let Some(c) = context_vis.borrow_mut().as_mut() {
							c.last_frame.set(None);
							if let Some(state) = c.state.as_mut() {
								state.set_visible(visible);
							}
						}
					},
				));
			}
		}

		let context_frame = context_init.clone();
		let ticker = FrameTicker::start(move |timestamp| {
			if let Some(c) = context_frame.borrow_mut().as_mut() {
				c.frame(timestamp);
			}
		});
		if ticker.is_none() {
			warn!("skills-graph: no window, render loop not started");
		}

		teardown.set_value(Some(Teardown {
			_ticker: ticker,
			_listeners: listeners,
			context: context_init.clone(),
		}));
	});

	let context_theme = context.clone();
	Effect::new(move |_| {
		let mode = color_mode.get();
		if let Some(state) = context_theme
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.state.as_mut())
		{
			state.set_color_mode(mode);
		}
	});

	on_cleanup(move || {
		teardown.try_update_value(|t| t.take());
	});

	let context_down = context.clone();
	let on_pointerdown = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		let mut guard = context_down.borrow_mut();
		let Some(state) = guard.as_mut().and_then(|c| c.state.as_mut()) else {
			return;
		};
		if state.pointer_down(x, y, Some(ev.pointer_id())) {
			ev.prevent_default();
			log_dom_failure(canvas.set_pointer_capture(ev.pointer_id()), "pointer capture");
			set_cursor(&canvas, "grabbing");
		}
	};

	let context_move = context.clone();
	let on_pointermove = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		let mut guard = context_move.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		let lens_active = c.surfaces.lens_active();
		let Some(state) = c.state.as_mut() else {
			return;
		};
		state.pointer_move(x, y);
		if lens_active {
			state.request_redraw();
		}
		let cursor = if state.drag.node.is_some() {
			"grabbing"
		} else if state.highlight.hovered.is_some() {
			"grab"
		} else {
			"default"
		};
		set_cursor(&canvas, cursor);
	};

	let context_up = context.clone();
	let on_pointerup = move |_: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let mut guard = context_up.borrow_mut();
		let Some(state) = guard.as_mut().and_then(|c| c.state.as_mut()) else {
			return;
		};
		if let Some(id) = state.pointer_up() {
			log_dom_failure(canvas.release_pointer_capture(id), "pointer release");
		}
		let cursor = if state.highlight.hovered.is_some() {
			"grab"
		} else {
			"default"
		};
		set_cursor(&canvas, cursor);
	};

	let context_leave = context.clone();
	let on_pointerleave = move |_: PointerEvent| {
		if let Some(state) = context_leave
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.state.as_mut())
		{
			state.pointer_leave();
		}
		if let Some(canvas) = canvas_ref.get() {
			set_cursor(&canvas, "default");
		}
	};
	let on_pointercancel = on_pointerleave.clone();

	view! {
		<canvas
			node_ref=canvas_ref
			class="skills-graph-canvas"
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:pointerleave=on_pointerleave
			on:pointercancel=on_pointercancel
			style="display: block; touch-action: none;"
		/>
	}
}
