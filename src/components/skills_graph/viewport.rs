//! Camera fitting for the skills graph.
//!
//! Each frame the bounding box of all node rectangles is fitted into the
//! drawing area (the part of the canvas not covered by host chrome such as a
//! sidebar). The live [`ViewState`] springs toward that fit instead of
//! snapping, so the camera glides while the graph settles or is dragged.

use serde::Deserialize;

use super::physics::SimNode;

/// Camera spring coefficients and fit limits.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
	/// Spring constant pulling the camera toward its fit.
	pub spring_k: f64,
	/// Camera velocity retained per frame. Must be below 1.
	pub damping: f64,
	/// Screen-space margin kept around the fitted bounds.
	pub margin: f64,
	/// Smallest fitted zoom, so large graphs stay legible.
	pub min_scale: f64,
	/// Largest fitted zoom, so small graphs do not balloon.
	pub max_scale: f64,
	/// Distance to target below which the camera counts as converged.
	pub converge_epsilon: f64,
	/// Smallest world width used for fitting, so a lone root does not zoom in.
	pub min_world_width: f64,
	/// Smallest world height used for fitting.
	pub min_world_height: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			spring_k: 0.006,
			damping: 0.9,
			margin: 60.0,
			min_scale: 0.6,
			max_scale: 1.5,
			converge_epsilon: 0.05,
			min_world_width: 60.0,
			min_world_height: 40.0,
		}
	}
}

/// Canvas size in CSS pixels, with the width on the left hidden by chrome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Width on the left covered by host chrome. Never exceeds `width`.
	pub reserved_left: f64,
}

impl Viewport {
	/// Clamps the reserved width into the canvas.
	pub fn new(width: f64, height: f64, reserved_left: f64) -> Self {
		Self {
			width,
			height,
			reserved_left: reserved_left.clamp(0.0, width.max(0.0)),
		}
	}

	/// Width of the drawing area right of the reserved chrome.
	pub fn available_width(&self) -> f64 {
		(self.width - self.reserved_left).max(1.0)
	}

	/// Center of the visible drawing area, screen space.
	pub fn center(&self) -> (f64, f64) {
		(
			self.reserved_left + self.available_width() / 2.0,
			self.height / 2.0,
		)
	}
}

/// Axis-aligned world bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Bounds of all node rectangles; a placeholder box when empty.
	pub fn of_nodes(nodes: &[SimNode]) -> Self {
		let mut b = Bounds {
			min_x: f64::INFINITY,
			min_y: f64::INFINITY,
			max_x: f64::NEG_INFINITY,
			max_y: f64::NEG_INFINITY,
		};
		for n in nodes {
			b.min_x = b.min_x.min(n.x - n.width / 2.0);
			b.max_x = b.max_x.max(n.x + n.width / 2.0);
			b.min_y = b.min_y.min(n.y - n.height / 2.0);
			b.max_y = b.max_y.max(n.y + n.height / 2.0);
		}
		if !b.min_x.is_finite() || !b.min_y.is_finite() {
			b = Bounds {
				min_x: 0.0,
				min_y: 0.0,
				max_x: 100.0,
				max_y: 100.0,
			};
		}
		b
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Midpoint of the box.
	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}

/// Where the camera wants to be.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTarget {
	/// Horizontal pan in screen pixels.
	pub x: f64,
	/// Vertical pan in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub scale: f64,
}

impl ViewTarget {
	/// Largest scale in `[min_scale, max_scale]` that fits `bounds` plus the
	/// margin, panned so the bounds are centered in the drawing area.
	pub fn fit(bounds: &Bounds, viewport: &Viewport, config: &ViewConfig) -> Self {
		let world_w = bounds.width().max(config.min_world_width);
		let world_h = bounds.height().max(config.min_world_height);
		let avail_w = (viewport.available_width() - config.margin * 2.0).max(1.0);
		let avail_h = (viewport.height - config.margin * 2.0).max(1.0);
		let scale = (avail_w / world_w)
			.min(avail_h / world_h)
			.clamp(config.min_scale, config.max_scale);

		let (wx, wy) = bounds.center();
		let (sx, sy) = viewport.center();
		Self {
			x: sx - scale * wx,
			y: sy - scale * wy,
			scale,
		}
	}
}

/// Live camera transform: `screen = world * scale + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
	/// Horizontal pan in screen pixels.
	pub x: f64,
	/// Vertical pan in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub scale: f64,
	/// Pan velocity, x axis.
	pub vx: f64,
	/// Pan velocity, y axis.
	pub vy: f64,
	/// Zoom velocity.
	pub vscale: f64,
}

impl Default for ViewState {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			scale: 1.0,
			vx: 0.0,
			vy: 0.0,
			vscale: 0.0,
		}
	}
}

impl ViewState {
	/// One damped spring step toward `target`.
	pub fn step_towards(&mut self, target: &ViewTarget, config: &ViewConfig) {
		let (k, d) = (config.spring_k, config.damping);
		self.vx = (self.vx + (target.x - self.x) * k) * d;
		self.vy = (self.vy + (target.y - self.y) * k) * d;
		self.vscale = (self.vscale + (target.scale - self.scale) * k) * d;
		self.x += self.vx;
		self.y += self.vy;
		self.scale += self.vscale;
	}

	/// Jumps onto `target` and drops any camera motion.
	pub fn reset(&mut self, target: &ViewTarget) {
		*self = Self {
			x: target.x,
			y: target.y,
			scale: target.scale,
			..Self::default()
		};
	}

	/// Whether position, zoom and their velocities are all within `epsilon`
	/// of the target. Zoom uses a hundredth of it.
	pub fn is_converged(&self, target: &ViewTarget, epsilon: f64) -> bool {
		(self.x - target.x).abs() < epsilon
			&& (self.y - target.y).abs() < epsilon
			&& (self.scale - target.scale).abs() < epsilon * 0.01
			&& self.vx.abs() < epsilon
			&& self.vy.abs() < epsilon
			&& self.vscale.abs() < epsilon * 0.01
	}

	/// Inverse of [`Self::world_to_screen`].
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.scale, (sy - self.y) / self.scale)
	}

	/// Applies the camera transform.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.scale + self.x, wy * self.scale + self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(x: f64, y: f64, width: f64, height: f64) -> SimNode {
		SimNode {
			label: String::new(),
			depth: 1,
			base_hue: None,
			level: None,
			parent: Some(0),
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			ax: 0.0,
			ay: 0.0,
			pin: None,
			width,
			height,
		}
	}

	#[test]
	fn bounds_cover_node_rectangles() {
		let nodes = [node(0.0, 0.0, 100.0, 20.0), node(200.0, 50.0, 40.0, 30.0)];
		let b = Bounds::of_nodes(&nodes);
		assert_eq!(b, Bounds { min_x: -50.0, min_y: -10.0, max_x: 220.0, max_y: 65.0 });
		assert_eq!(Bounds::of_nodes(&[]).width(), 100.0);
	}

	#[test]
	fn fit_centers_bounds_in_area_right_of_chrome() {
		let config = ViewConfig::default();
		let viewport = Viewport::new(1000.0, 600.0, 200.0);
		let bounds = Bounds { min_x: 0.0, min_y: 0.0, max_x: 400.0, max_y: 200.0 };
		let target = ViewTarget::fit(&bounds, &viewport, &config);

		// (800 - 120) / 400 = 1.7, (600 - 120) / 200 = 2.4; clamped to 1.5.
		assert_eq!(target.scale, 1.5);
		let view = ViewState { x: target.x, y: target.y, scale: target.scale, ..ViewState::default() };
		assert_eq!(view.world_to_screen(200.0, 100.0), (600.0, 300.0));
	}

	#[test]
	fn large_graph_hits_minimum_scale() {
		let config = ViewConfig::default();
		let viewport = Viewport::new(400.0, 300.0, 0.0);
		let bounds = Bounds { min_x: 0.0, min_y: 0.0, max_x: 5000.0, max_y: 5000.0 };
		assert_eq!(ViewTarget::fit(&bounds, &viewport, &config).scale, 0.6);
	}

	#[test]
	fn screen_world_round_trip() {
		let view = ViewState { x: 30.0, y: -12.0, scale: 1.25, ..ViewState::default() };
		let (wx, wy) = view.screen_to_world(130.0, 88.0);
		assert_eq!((wx, wy), (80.0, 80.0));
		assert_eq!(view.world_to_screen(wx, wy), (130.0, 88.0));
	}

	#[test]
	fn camera_converges_on_static_nodes() {
		let config = ViewConfig::default();
		let viewport = Viewport::new(900.0, 700.0, 0.0);
		let nodes = [node(-300.0, 10.0, 120.0, 30.0), node(500.0, 400.0, 80.0, 28.0)];
		let target = ViewTarget::fit(&Bounds::of_nodes(&nodes), &viewport, &config);

		let mut view = ViewState::default();
		let frames = (0..2000)
			.position(|_| {
				view.step_towards(&target, &config);
				view.is_converged(&target, config.converge_epsilon)
			})
			.expect("camera did not converge");
		assert!(frames < 1000, "took {frames} frames");
	}

	#[test]
	fn reset_snaps_without_motion() {
		let mut view = ViewState { vx: 3.0, vy: -2.0, vscale: 0.1, ..ViewState::default() };
		let target = ViewTarget { x: 12.0, y: 8.0, scale: 0.9 };
		view.reset(&target);
		assert!(view.is_converged(&target, 1e-9));
	}
}
