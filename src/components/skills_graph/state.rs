//! Per-instance graph state and pointer interaction.
//!
//! Combines the force simulation with the camera, hover highlight and drag
//! tracking. Created once when the canvas mounts, then advanced by the render
//! loop each frame. Pointer events only touch pins and hover; the physics
//! picks them up on the next step.

use std::collections::HashMap;

use log::{debug, info};

use super::config::GraphConfig;
use super::layout::layout_tree;
use super::physics::Simulation;
use super::style::StyleConfig;
use super::theme::{ColorMode, Theme};
use super::tree::{SkillDataError, build_tree};
use super::types::SkillEntry;
use super::viewport::{Bounds, ViewConfig, ViewState, ViewTarget, Viewport};

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragState {
	pub node: Option<usize>,
	pub pointer_id: Option<i32>,
}

/// Smoothed hover highlight over the hovered node and its direct neighbors.
///
/// Each node has an intensity in `0..=1` that eases toward 1 while the node
/// is highlighted and decays toward 0 afterwards.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub hovered: Option<usize>,
	targets: Vec<usize>,
	intensity: HashMap<usize, f64>,
}

impl HighlightState {
	/// Returns `true` when the hovered node changed.
	pub fn set_hover(&mut self, node: Option<usize>, edges: &[(usize, usize)]) -> bool {
		if self.hovered == node {
			return false;
		}
		self.hovered = node;
		self.targets.clear();
		if let Some(idx) = node {
			self.targets.push(idx);
			for &(a, b) in edges {
				if a == idx {
					self.targets.push(b);
				} else if b == idx {
					self.targets.push(a);
				}
			}
		}
		true
	}

	/// Eases intensities. Returns `true` while anything is still animating.
	pub fn tick(&mut self, dt: f64) -> bool {
		const FADE_IN_SPEED: f64 = 8.0;
		const FADE_OUT_SPEED: f64 = 5.0;
		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		let mut animating = false;
		for &idx in &self.targets {
			let v = self.intensity.entry(idx).or_insert(0.0);
			*v += (1.0 - *v) * fade_in;
			animating |= *v < 0.995;
		}
		let targets = &self.targets;
		self.intensity.retain(|idx, v| {
			if targets.contains(idx) {
				return true;
			}
			*v *= fade_out;
			animating = true;
			*v > 0.005
		});
		animating
	}

	pub fn intensity(&self, idx: usize) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}
}

/// Everything one mounted skills graph needs between frames.
pub struct SkillsGraphState {
	pub sim: Simulation,
	pub view: ViewState,
	pub view_config: ViewConfig,
	pub viewport: Viewport,
	pub style: StyleConfig,
	pub theme: Theme,
	pub drag: DragState,
	pub highlight: HighlightState,
	/// Last pointer position over the canvas, screen space.
	pub pointer: Option<(f64, f64)>,
	/// Seconds since creation; drives color drift and lens grain.
	pub elapsed: f64,
	pub visible: bool,
	edges: Vec<(usize, usize)>,
	needs_refit: bool,
	dirty: bool,
}

impl SkillsGraphState {
	/// Builds tree, layout and simulation for `entries`.
	///
	/// `measure` returns the width of a label rendered in a CSS font.
	pub fn new(
		entries: &[SkillEntry],
		root_label: &str,
		config: &GraphConfig,
		viewport: Viewport,
		mode: ColorMode,
		measure: impl FnMut(&str, &str) -> f64,
	) -> Result<Self, SkillDataError> {
		let tree = build_tree(entries, root_label)?;
		let layout = layout_tree(&tree, &config.layout);
		let sim = Simulation::from_layout(
			&layout,
			config.physics.clone(),
			&config.style,
			viewport.center(),
			measure,
		);
		info!(
			"skills-graph: {} skills in {} categories",
			entries.len(),
			tree.children.len()
		);

		Ok(Self {
			sim,
			view: ViewState::default(),
			view_config: config.view.clone(),
			viewport,
			style: config.style.clone(),
			theme: Theme::for_mode(mode),
			drag: DragState::default(),
			highlight: HighlightState::default(),
			pointer: None,
			elapsed: 0.0,
			visible: true,
			edges: layout.edges,
			needs_refit: false,
			dirty: true,
		})
	}

	/// World point the centering force pulls toward.
	pub fn center(&self) -> (f64, f64) {
		self.viewport.center()
	}

	pub fn fit_target(&self) -> ViewTarget {
		ViewTarget::fit(
			&Bounds::of_nodes(&self.sim.nodes),
			&self.viewport,
			&self.view_config,
		)
	}

	/// Advances physics and camera by one frame. Returns `true` when the
	/// frame needs to be redrawn.
	pub fn tick(&mut self, dt: f64) -> bool {
		if !self.visible {
			return false;
		}
		self.elapsed += dt;

		let moved = self.sim.step(self.center());
		let target = self.fit_target();
		if self.needs_refit {
			self.view.reset(&target);
			self.needs_refit = false;
		} else {
			self.view.step_towards(&target, &self.view_config);
		}
		let camera_moving = !self
			.view
			.is_converged(&target, self.view_config.converge_epsilon);
		let highlighting = self.highlight.tick(dt);

		let redraw = moved || camera_moving || highlighting || self.dirty;
		self.dirty = false;
		redraw
	}

	pub fn node_at_screen(&self, sx: f64, sy: f64) -> Option<usize> {
		let (wx, wy) = self.view.screen_to_world(sx, sy);
		self.sim.node_at(wx, wy)
	}

	/// Starts dragging the topmost node under the pointer. The root is
	/// never draggable. Returns `true` when a drag started.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, pointer_id: Option<i32>) -> bool {
		self.pointer = Some((sx, sy));
		if self.drag.node.is_some() {
			return false;
		}
		let Some(idx) = self.node_at_screen(sx, sy) else {
			return false;
		};
		if idx == self.sim.root() {
			return false;
		}
		let (wx, wy) = self.view.screen_to_world(sx, sy);
		self.sim.pin(idx, wx, wy);
		self.drag = DragState {
			node: Some(idx),
			pointer_id,
		};
		debug!("skills-graph: dragging {}", self.sim.nodes[idx].label);
		true
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		self.pointer = Some((sx, sy));
		if let Some(idx) = self.drag.node {
			let (wx, wy) = self.view.screen_to_world(sx, sy);
			self.sim.pin(idx, wx, wy);
		} else {
			let hovered = self.node_at_screen(sx, sy);
			self.dirty |= self.highlight.set_hover(hovered, &self.edges);
		}
	}

	/// Ends the drag and returns the node to free simulation.
	pub fn pointer_up(&mut self) -> Option<i32> {
		let drag = std::mem::take(&mut self.drag);
		if let Some(idx) = drag.node {
			self.sim.unpin(idx);
		}
		drag.pointer_id
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.pointer = None;
		self.dirty |= self.highlight.set_hover(None, &self.edges);
	}

	/// Adopts a new canvas size. World positions stay put; the camera is
	/// re-fitted on the next frame.
	pub fn resize(&mut self, viewport: Viewport) {
		if viewport == self.viewport {
			return;
		}
		self.viewport = viewport;
		self.needs_refit = true;
		self.sim.note_interaction();
		self.dirty = true;
	}

	pub fn set_color_mode(&mut self, mode: ColorMode) {
		if self.theme.mode != mode {
			self.theme = Theme::for_mode(mode);
			self.dirty = true;
		}
	}

	/// Forces the next [`tick`](Self::tick) to report a redraw.
	pub fn request_redraw(&mut self) {
		self.dirty = true;
	}

	pub fn set_visible(&mut self, visible: bool) {
		if visible && !self.visible {
			self.dirty = true;
		}
		self.visible = visible;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::skills_graph::style::estimate_text_width;

	fn state() -> SkillsGraphState {
		let entries: Vec<SkillEntry> = ["A", "B", "C", "D", "E", "F"]
			.iter()
			.enumerate()
			.map(|(i, name)| SkillEntry::new(*name, if i < 3 { "X" } else { "Y" }))
			.collect();
		SkillsGraphState::new(
			&entries,
			"Skills",
			&GraphConfig::default(),
			Viewport::new(900.0, 700.0, 0.0),
			ColorMode::Dark,
			estimate_text_width,
		)
		.unwrap()
	}

	fn leaf(state: &SkillsGraphState) -> usize {
		state.sim.nodes.len() - 1
	}

	#[test]
	fn drag_pins_and_releases_node() {
		let mut s = state();
		let idx = leaf(&s);
		let (x, y) = (s.sim.nodes[idx].x, s.sim.nodes[idx].y);

		assert!(s.pointer_down(x, y, Some(7)));
		assert_eq!(s.drag.node, Some(idx));

		s.pointer_move(100.0, 50.0);
		let expected = s.view.screen_to_world(100.0, 50.0);
		s.tick(1.0 / 60.0);
		let node = &s.sim.nodes[idx];
		assert_eq!(node.pin.map(|_| (node.x, node.y)), Some(expected));
		assert_eq!((node.vx, node.vy), (0.0, 0.0));

		assert_eq!(s.pointer_up(), Some(7));
		assert!(s.sim.nodes[idx].pin.is_none());
		s.tick(1.0 / 60.0);
		let node = &s.sim.nodes[idx];
		assert!(node.vx != 0.0 || node.vy != 0.0);
	}

	#[test]
	fn root_is_not_draggable() {
		let mut s = state();
		let root = s.sim.root();
		let (x, y) = (s.sim.nodes[root].x, s.sim.nodes[root].y);
		assert_eq!(s.node_at_screen(x, y), Some(root));
		assert!(!s.pointer_down(x, y, None));
		assert_eq!(s.drag, DragState::default());
	}

	#[test]
	fn only_one_drag_at_a_time() {
		let mut s = state();
		let idx = leaf(&s);
		let (x, y) = (s.sim.nodes[idx].x, s.sim.nodes[idx].y);
		assert!(s.pointer_down(x, y, Some(1)));
		let other = idx - 1;
		let (ox, oy) = (s.sim.nodes[other].x, s.sim.nodes[other].y);
		assert!(!s.pointer_down(ox, oy, Some(2)));
		assert_eq!(s.drag.node, Some(idx));
	}

	#[test]
	fn hover_highlights_neighbors_and_fades() {
		let mut s = state();
		let idx = leaf(&s);
		let parent = s.sim.nodes[idx].parent.unwrap();
		let (x, y) = (s.sim.nodes[idx].x, s.sim.nodes[idx].y);

		s.pointer_move(x, y);
		assert_eq!(s.highlight.hovered, Some(idx));
		for _ in 0..60 {
			s.tick(1.0 / 60.0);
		}
		assert!(s.highlight.intensity(idx) > 0.9);
		assert!(s.highlight.intensity(parent) > 0.9);
		assert_eq!(s.highlight.intensity(s.sim.root()), 0.0);

		s.pointer_leave();
		assert_eq!(s.highlight.hovered, None);
		assert!(s.pointer.is_none());
		for _ in 0..120 {
			s.tick(1.0 / 60.0);
		}
		assert_eq!(s.highlight.intensity(idx), 0.0);
	}

	#[test]
	fn resize_refits_camera_without_moving_nodes() {
		let mut s = state();
		for _ in 0..5 {
			s.tick(1.0 / 60.0);
		}
		let before: Vec<(f64, f64)> = s.sim.nodes.iter().map(|n| (n.x, n.y)).collect();

		s.resize(Viewport::new(500.0, 400.0, 120.0));
		let after: Vec<(f64, f64)> = s.sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);

		assert!(s.tick(1.0 / 60.0));
		let target = s.fit_target();
		assert_eq!((s.view.vx, s.view.vy, s.view.vscale), (0.0, 0.0, 0.0));
		assert!(s.view.scale >= s.view_config.min_scale && s.view.scale <= s.view_config.max_scale);
		assert!((s.view.scale - target.scale).abs() < 0.05);
	}

	#[test]
	fn hidden_graph_does_no_work() {
		let mut s = state();
		s.set_visible(false);
		let before: Vec<(f64, f64)> = s.sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert!(!s.tick(1.0 / 60.0));
		let after: Vec<(f64, f64)> = s.sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
		assert_eq!(s.elapsed, 0.0);
	}

	#[test]
	fn color_mode_switch_keeps_physics() {
		let mut s = state();
		s.tick(1.0 / 60.0);
		let before: Vec<(f64, f64)> = s.sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		s.set_color_mode(ColorMode::Light);
		assert_eq!(s.theme.mode, ColorMode::Light);
		let after: Vec<(f64, f64)> = s.sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn settled_graph_stops_redrawing() {
		let mut s = state();
		let redraws = (0..6000).filter(|_| s.tick(1.0 / 60.0)).count();
		assert!(s.sim.is_settled());
		assert!(redraws < 6000);
		assert!(!s.tick(1.0 / 60.0));
	}

	#[test]
	fn blank_category_fails_construction() {
		let result = SkillsGraphState::new(
			&[SkillEntry::new("A", "")],
			"Skills",
			&GraphConfig::default(),
			Viewport::new(100.0, 100.0, 0.0),
			ColorMode::Light,
			estimate_text_width,
		);
		assert!(result.is_err());
	}
}
