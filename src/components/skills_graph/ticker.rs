//! Frame scheduling and DOM listener lifetimes.
//!
//! [`FrameTicker`] re-arms `requestAnimationFrame` after every frame until it
//! is stopped or dropped. [`ListenerHandle`] removes its event listener when
//! dropped. Together they let the component tear everything down by dropping
//! a single value.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

struct TickerInner {
	handle: Cell<Option<i32>>,
	callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl TickerInner {
	fn schedule(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(cb) = self.callback.borrow().as_ref() {
			match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => self.handle.set(Some(id)),
				Err(e) => warn!("skills-graph: requestAnimationFrame failed: {e:?}"),
			}
		}
	}
}

/// A display-synchronized render loop with a cancellation handle.
///
/// Must not be stopped from inside its own frame callback.
pub struct FrameTicker {
	inner: Rc<TickerInner>,
}

impl FrameTicker {
	/// Starts calling `on_frame` with the frame timestamp (milliseconds) once
	/// per display refresh. Returns `None` outside a browser.
	pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Option<Self> {
		web_sys::window()?;
		let inner = Rc::new(TickerInner {
			handle: Cell::new(None),
			callback: RefCell::new(None),
		});

		let weak = Rc::downgrade(&inner);
		let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
			on_frame(timestamp);
			if let Some(inner) = weak.upgrade() {
				inner.schedule();
			}
		});
		*inner.callback.borrow_mut() = Some(callback);
		inner.schedule();
		Some(Self { inner })
	}

	/// Cancels the pending frame and releases the callback.
	pub fn stop(&self) {
		if let Some(id) = self.inner.handle.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
		if self.inner.callback.borrow_mut().take().is_some() {
			debug!("skills-graph: render loop stopped");
		}
	}
}

impl Drop for FrameTicker {
	fn drop(&mut self) {
		self.stop();
	}
}

/// An event listener that is removed when the handle is dropped.
pub struct ListenerHandle {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl ListenerHandle {
	pub fn new(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Option<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
			Ok(()) => Some(Self {
				target: target.clone(),
				event,
				callback,
			}),
			Err(e) => {
				warn!("skills-graph: unable to listen for {event}: {e:?}");
				None
			}
		}
	}
}

impl Drop for ListenerHandle {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Whether the page is currently hidden (background tab, minimized window).
pub fn is_document_hidden() -> bool {
	web_sys::window()
		.and_then(|w| w.document())
		.map(|d| d.hidden())
		.unwrap_or(false)
}
