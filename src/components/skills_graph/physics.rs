//! Force simulation for the skills graph.
//!
//! Owns all mutable per-node kinematic state. Every call to
//! [`Simulation::step`] advances the system by one fixed step:
//!
//! 1. reset accelerations
//! 2. Hookean springs along parent/child edges
//! 3. pairwise forces, tiered by hierarchy (root, categories, siblings)
//! 4. soft overlap penalty so labels do not stack, derived from a potential
//!    over the elliptical distance between node centers
//! 5. centering pull, stronger vertically than horizontally
//! 6. pin enforcement
//! 7. damped explicit integration with a per-axis velocity clamp
//!
//! Coefficients are per frame, not per second. The render loop fires at a
//! roughly constant rate and a fixed step keeps the system stable.

use log::debug;
use serde::Deserialize;

use super::layout::TreeLayout;
use super::style::StyleConfig;

/// Charge multipliers and sibling attraction. Only the ordering
/// `root >> category >= cross_branch > sibling attraction` matters; the
/// numbers are visual tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChargeTiers {
	/// Multiplier for any pair involving the root.
	pub root: f64,
	/// Multiplier for pairs of category nodes.
	pub category: f64,
	/// Multiplier for every other non-sibling pair.
	pub cross_branch: f64,
	/// Spring constant pulling siblings toward `sibling_separation`.
	pub sibling_attraction: f64,
	/// Preferred distance between siblings.
	pub sibling_separation: f64,
}

impl Default for ChargeTiers {
	fn default() -> Self {
		Self {
			root: 6.0,
			category: 2.4,
			cross_branch: 1.0,
			sibling_attraction: 0.002,
			sibling_separation: 90.0,
		}
	}
}

impl ChargeTiers {
	/// Whether the multipliers keep the intended visual ordering.
	pub fn is_ordered(&self) -> bool {
		self.root > self.category
			&& self.category >= self.cross_branch
			&& self.cross_branch > self.sibling_attraction
	}
}

/// Where nodes start before the first step.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
	/// Layout positions, translated so the root sits on the anchor.
	Layout,
	/// Everything starts in a small square around the root and unfolds.
	Burst {
		/// Half side of the seeding square in world units.
		spread: f64,
	},
}

/// Simulation coefficients.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
	/// Spring constant of parent/child edges.
	pub spring_k: f64,
	/// Velocity retained per step. Must be below 1.
	pub damping: f64,
	/// Base repulsion between node pairs, scaled by [`ChargeTiers`].
	pub charge: f64,
	/// Horizontal pull toward the anchor.
	pub center_k_x: f64,
	/// Vertical pull toward the anchor. Stronger than the horizontal one so
	/// the graph spreads wide rather than tall.
	pub center_k_y: f64,
	/// Per-axis velocity limit.
	pub max_velocity: f64,
	/// Floor for squared distances in the repulsion term.
	pub min_distance_sq: f64,
	/// Rest length of edges leaving the root.
	pub rest_length_base: f64,
	/// Rest length shrinks by this factor per depth of the edge's source.
	pub rest_length_falloff: f64,
	/// Hierarchy-dependent charge multipliers.
	pub tiers: ChargeTiers,
	/// Penalty stiffness for overlapping node rectangles.
	pub collision_strength: f64,
	/// Mean node speed below which the system counts as settled.
	pub settle_speed: f64,
	/// Frames after an interaction before the settled short-circuit applies.
	pub settle_grace_frames: u32,
	/// Initial placement of nodes.
	pub seeding: Seeding,
}

impl Default for PhysicsConfig {
	fn default() -> Self {
		Self {
			spring_k: 0.008,
			damping: 0.9,
			charge: 1200.0,
			center_k_x: 0.002,
			center_k_y: 0.006,
			max_velocity: 6.0,
			min_distance_sq: 36.0,
			rest_length_base: 220.0,
			rest_length_falloff: 0.7,
			tiers: ChargeTiers::default(),
			collision_strength: 0.08,
			settle_speed: 0.015,
			settle_grace_frames: 90,
			seeding: Seeding::Layout,
		}
	}
}

impl PhysicsConfig {
	/// Edge rest length for an edge whose source sits at `source_depth`.
	pub fn rest_length(&self, source_depth: usize) -> f64 {
		self.rest_length_base * self.rest_length_falloff.powi(source_depth as i32)
	}
}

/// A simulated node. Geometry is fixed at construction; kinematics change
/// every step.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// Display label.
	pub label: String,
	/// Distance from the root; 0 for the root itself.
	pub depth: usize,
	/// Hue of the category this node belongs to. `None` for the root.
	pub base_hue: Option<f64>,
	/// Proficiency from 0 to 100, when the data carries one.
	pub level: Option<u8>,
	/// Index of the parent node. `None` only for the root.
	pub parent: Option<usize>,
	/// Horizontal center in world units.
	pub x: f64,
	/// Vertical center in world units.
	pub y: f64,
	/// Horizontal velocity in world units per step.
	pub vx: f64,
	/// Vertical velocity in world units per step.
	pub vy: f64,
	/// Horizontal acceleration accumulated during the current step.
	pub ax: f64,
	/// Vertical acceleration accumulated during the current step.
	pub ay: f64,
	/// Absolute position constraint. Set for the root and the dragged node.
	pub pin: Option<(f64, f64)>,
	/// Rectangle width in world units, sized to the label.
	pub width: f64,
	/// Rectangle height in world units, from the depth tier.
	pub height: f64,
}

impl SimNode {
	/// Whether this is the hierarchy root.
	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}

	/// Magnitude of the velocity.
	pub fn speed(&self) -> f64 {
		self.vx.hypot(self.vy)
	}

	/// Whether the world point lies inside the node rectangle.
	pub fn contains(&self, wx: f64, wy: f64) -> bool {
		(wx - self.x).abs() < self.width / 2.0 && (wy - self.y).abs() < self.height / 2.0
	}
}

/// Parent/child spring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimEdge {
	/// Parent node index.
	pub source: usize,
	/// Child node index.
	pub target: usize,
	/// Length at which the spring exerts no force.
	pub rest_length: f64,
}

/// The mutable node/edge set plus settle tracking.
pub struct Simulation {
	/// Nodes in layout order; the root is always present.
	pub nodes: Vec<SimNode>,
	/// One spring per parent/child pair.
	pub edges: Vec<SimEdge>,
	/// Coefficients used by every step.
	pub config: PhysicsConfig,
	root: usize,
	frames_since_interaction: u32,
	settled: bool,
}

/// Direction used when two nodes sit exactly on top of each other.
fn fallback_direction(a: usize, b: usize) -> (f64, f64) {
	let angle = ((a as f64) * 0.618_034 + (b as f64) * 0.414_214) * std::f64::consts::TAU;
	(angle.cos(), angle.sin())
}

/// Deterministic value in `[0, 1)`.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

impl Simulation {
	/// Creates the simulation from a layout. The root is pinned at `anchor`.
	///
	/// `measure` returns the rendered width of a label in the given CSS font.
	pub fn from_layout(
		layout: &TreeLayout,
		config: PhysicsConfig,
		style: &StyleConfig,
		anchor: (f64, f64),
		mut measure: impl FnMut(&str, &str) -> f64,
	) -> Self {
		let root_layout = &layout.nodes[layout.root];
		let (origin_x, origin_y) = (root_layout.x, root_layout.y);

		let nodes: Vec<SimNode> = layout
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| {
				let label = style.label(&n.name, n.depth);
				let text_width = measure(&label, &style.font(n.depth));
				let (width, height) = style.node_size(text_width, n.depth);
				let (x, y) = if n.parent.is_none() {
					anchor
				} else {
					match config.seeding {
						Seeding::Layout => (anchor.0 + n.x - origin_x, anchor.1 + n.y - origin_y),
						Seeding::Burst { spread } => (
							anchor.0 + (pseudo_random(i as f64 + 1.0) - 0.5) * spread,
							anchor.1 + (pseudo_random(i as f64 + 101.0) - 0.5) * spread,
						),
					}
				};
				SimNode {
					label,
					depth: n.depth,
					base_hue: n.base_hue,
					level: n.level,
					parent: n.parent,
					x,
					y,
					vx: 0.0,
					vy: 0.0,
					ax: 0.0,
					ay: 0.0,
					pin: n.parent.is_none().then_some(anchor),
					width,
					height,
				}
			})
			.collect();

		let edges = layout
			.edges
			.iter()
			.map(|&(source, target)| SimEdge {
				source,
				target,
				rest_length: config.rest_length(layout.nodes[source].depth),
			})
			.collect::<Vec<_>>();

		debug!(
			"skills-graph: simulation with {} nodes, {} edges",
			nodes.len(),
			edges.len()
		);

		Self {
			nodes,
			edges,
			config,
			root: layout.root,
			frames_since_interaction: 0,
			settled: false,
		}
	}

	/// Index of the root node.
	pub fn root(&self) -> usize {
		self.root
	}

	/// Sum of node speeds.
	pub fn kinetic_energy(&self) -> f64 {
		self.nodes.iter().map(SimNode::speed).sum()
	}

	/// Kinetic energy normalized to `[0, 1]` for visual effects.
	pub fn energy(&self) -> f64 {
		if self.nodes.is_empty() {
			return 0.0;
		}
		(self.kinetic_energy() / (self.nodes.len() as f64 * 2.0)).min(1.0)
	}

	/// Whether the system is at rest and past the interaction grace period.
	pub fn is_settled(&self) -> bool {
		self.settled
	}

	/// Resets the settle grace period. Called on drag and resize.
	pub fn note_interaction(&mut self) {
		self.frames_since_interaction = 0;
		self.settled = false;
	}

	/// Pins node `idx` at a world position.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pin = Some((x, y));
			self.note_interaction();
		}
	}

	/// Releases the pin on `idx`. The root stays pinned.
	pub fn unpin(&mut self, idx: usize) {
		if idx == self.root {
			return;
		}
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pin = None;
			self.note_interaction();
		}
	}

	/// Topmost node whose rectangle contains the world point. Later nodes
	/// are drawn on top, so the search runs back to front.
	pub fn node_at(&self, wx: f64, wy: f64) -> Option<usize> {
		self.nodes.iter().rposition(|n| n.contains(wx, wy))
	}

	/// Advances one step, pulling toward `center`. Returns `false` when the
	/// system is settled and the step was skipped.
	pub fn step(&mut self, center: (f64, f64)) -> bool {
		self.frames_since_interaction = self.frames_since_interaction.saturating_add(1);
		if self.settled {
			return false;
		}

		for node in &mut self.nodes {
			node.ax = 0.0;
			node.ay = 0.0;
		}
		self.apply_springs();
		self.apply_pair_forces();
		self.apply_collisions();
		self.apply_centering(center);
		self.integrate();

		let n = self.nodes.len().max(1) as f64;
		if self.kinetic_energy() / n < self.config.settle_speed
			&& self.frames_since_interaction > self.config.settle_grace_frames
		{
			debug!("skills-graph: simulation settled");
			self.settled = true;
		}
		true
	}

	fn apply_springs(&mut self) {
		let k = self.config.spring_k;
		for edge in &self.edges {
			let (s, t) = (&self.nodes[edge.source], &self.nodes[edge.target]);
			let (dx, dy) = (t.x - s.x, t.y - s.y);
			let dist = dx.hypot(dy).max(1.0);
			let force = k * (dist - edge.rest_length);
			let (fx, fy) = (force * dx / dist, force * dy / dist);

			let source = &mut self.nodes[edge.source];
			source.ax += fx;
			source.ay += fy;
			let target = &mut self.nodes[edge.target];
			target.ax -= fx;
			target.ay -= fy;
		}
	}

	fn apply_pair_forces(&mut self) {
		let cfg = &self.config;
		let tiers = &cfg.tiers;
		let count = self.nodes.len();

		for i in 0..count {
			for j in (i + 1)..count {
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
				let raw_sq = dx * dx + dy * dy;
				if raw_sq < 1e-12 {
					let (ux, uy) = fallback_direction(i, j);
					dx = ux;
					dy = uy;
				}
				let dist2 = raw_sq.max(cfg.min_distance_sq);
				let dist = dist2.sqrt();
				let norm = dx.hypot(dy);
				let (ux, uy) = (dx / norm, dy / norm);

				let siblings = a.parent.is_some() && a.parent == b.parent;
				let force = if a.is_root() || b.is_root() {
					-cfg.charge * tiers.root / dist2
				} else if a.depth == 1 && b.depth == 1 {
					-cfg.charge * tiers.category / dist2
				} else if siblings {
					tiers.sibling_attraction * (dist - tiers.sibling_separation)
				} else {
					-cfg.charge * tiers.cross_branch / dist2
				};

				// Positive force pulls the pair together.
				let (fx, fy) = (force * ux, force * uy);
				self.nodes[i].ax += fx;
				self.nodes[i].ay += fy;
				self.nodes[j].ax -= fx;
				self.nodes[j].ay -= fy;
			}
		}
	}

	/// Overlap penalty from the potential `k/4 * h² * (1 - s)²`, where `s` is
	/// the center distance normalized by the pair's half-extents. A gradient
	/// force can only trade energy with the springs, so damping still brings
	/// the system to rest.
	fn apply_collisions(&mut self) {
		let k = self.config.collision_strength;
		if k <= 0.0 {
			return;
		}
		let count = self.nodes.len();
		for i in 0..count {
			for j in (i + 1)..count {
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let w = ((a.width + b.width) / 2.0).max(1.0);
				let h = ((a.height + b.height) / 2.0).max(1.0);
				let (dx, dy) = (b.x - a.x, b.y - a.y);
				let s = (dx / w).hypot(dy / h);
				if s >= 1.0 {
					continue;
				}
				let (gx, gy) = if s > 1e-9 {
					(dx / (w * w) / s, dy / (h * h) / s)
				} else {
					let (ux, uy) = fallback_direction(i, j);
					(ux / w, uy / h)
				};
				let push = k * h * h * (1.0 - s) / 2.0;
				let (px, py) = (push * gx, push * gy);
				self.nodes[i].ax -= px;
				self.nodes[i].ay -= py;
				self.nodes[j].ax += px;
				self.nodes[j].ay += py;
			}
		}
	}

	fn apply_centering(&mut self, (cx, cy): (f64, f64)) {
		let (kx, ky) = (self.config.center_k_x, self.config.center_k_y);
		for node in &mut self.nodes {
			node.ax += (cx - node.x) * kx;
			node.ay += (cy - node.y) * ky;
		}
	}

	fn integrate(&mut self) {
		let (damping, max_v) = (self.config.damping, self.config.max_velocity);
		for node in &mut self.nodes {
			if let Some((px, py)) = node.pin {
				node.x = px;
				node.y = py;
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx = ((node.vx + node.ax) * damping).clamp(-max_v, max_v);
			node.vy = ((node.vy + node.ay) * damping).clamp(-max_v, max_v);
			node.x += node.vx;
			node.y += node.vy;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::skills_graph::layout::{LayoutConfig, layout_tree};
	use crate::components::skills_graph::style::estimate_text_width;
	use crate::components::skills_graph::tree::{TreeNode, build_tree};
	use crate::components::skills_graph::types::{SkillEntry, SubSkill};
	use proptest::prelude::*;

	const CENTER: (f64, f64) = (400.0, 300.0);

	fn skills(count: usize, categories: usize) -> Vec<SkillEntry> {
		(0..count)
			.map(|i| SkillEntry::new(format!("skill {i}"), format!("category {}", i % categories)))
			.collect()
	}

	fn simulation_for(tree: &TreeNode, config: PhysicsConfig) -> Simulation {
		let layout = layout_tree(tree, &LayoutConfig::default());
		Simulation::from_layout(&layout, config, &StyleConfig::default(), CENTER, estimate_text_width)
	}

	fn simulation(entries: &[SkillEntry]) -> Simulation {
		simulation_for(&build_tree(entries, "Skills").unwrap(), PhysicsConfig::default())
	}

	fn assert_finite(sim: &Simulation) {
		for n in &sim.nodes {
			for v in [n.x, n.y, n.vx, n.vy, n.ax, n.ay] {
				assert!(v.is_finite(), "{} has non-finite state", n.label);
			}
		}
	}

	#[test]
	fn default_tiers_are_ordered() {
		assert!(ChargeTiers::default().is_ordered());
		assert!(PhysicsConfig::default().damping < 1.0);
	}

	#[test]
	fn rest_length_shrinks_with_depth() {
		let cfg = PhysicsConfig::default();
		assert!(cfg.rest_length(0) > cfg.rest_length(1));
		assert!(cfg.rest_length(1) > cfg.rest_length(2));
	}

	#[test]
	fn construction_pins_root_and_builds_edges() {
		let sim = simulation(&skills(6, 2));
		let root = &sim.nodes[sim.root()];

		assert_eq!(root.label, "SKILLS");
		assert_eq!(root.pin, Some(CENTER));
		assert_eq!((root.x, root.y), CENTER);
		assert_eq!(sim.edges.len(), sim.nodes.len() - 1);
		for edge in &sim.edges {
			let expected = sim.config.rest_length(sim.nodes[edge.source].depth);
			assert_eq!(edge.rest_length, expected);
		}
		assert!(sim.nodes.iter().skip(1).all(|n| n.pin.is_none()));
	}

	#[test]
	fn root_only_graph_steps_quietly() {
		let mut sim = simulation(&[]);
		assert!(sim.edges.is_empty());
		for _ in 0..10 {
			sim.step(CENTER);
		}
		assert_eq!((sim.nodes[0].x, sim.nodes[0].y), CENTER);
		assert_eq!(sim.kinetic_energy(), 0.0);
	}

	#[test]
	fn pinned_node_sits_exactly_on_pin() {
		let mut sim = simulation(&skills(8, 3));
		let leaf = sim.nodes.len() - 1;

		sim.pin(leaf, 100.0, 50.0);
		sim.step(CENTER);
		let node = &sim.nodes[leaf];
		assert_eq!((node.x, node.y), (100.0, 50.0));
		assert_eq!((node.vx, node.vy), (0.0, 0.0));

		sim.unpin(leaf);
		sim.step(CENTER);
		let node = &sim.nodes[leaf];
		assert!(node.vx != 0.0 || node.vy != 0.0);
		assert!(node.pin.is_none());
	}

	#[test]
	fn root_cannot_be_unpinned() {
		let mut sim = simulation(&skills(3, 1));
		sim.unpin(sim.root());
		assert_eq!(sim.nodes[sim.root()].pin, Some(CENTER));
	}

	#[test]
	fn coincident_nodes_stay_finite_and_separate() {
		let mut sim = simulation(&skills(5, 1));
		for node in sim.nodes.iter_mut().skip(1) {
			node.x = 10.0;
			node.y = 10.0;
		}
		sim.step(CENTER);
		assert_finite(&sim);

		let (a, b) = (&sim.nodes[2], &sim.nodes[3]);
		assert!((a.x, a.y) != (b.x, b.y));
	}

	#[test]
	fn spring_pulls_stretched_edge_together() {
		let mut config = PhysicsConfig::default();
		config.charge = 0.0;
		config.center_k_x = 0.0;
		config.center_k_y = 0.0;
		config.collision_strength = 0.0;
		let mut sim = simulation_for(&build_tree(&skills(1, 1), "Skills").unwrap(), config);

		// root -> category -> skill; stretch the category far to the right.
		let category = sim.nodes.iter().position(|n| n.depth == 1).unwrap();
		sim.nodes[category].x = CENTER.0 + 2000.0;
		sim.nodes[category].y = CENTER.1;
		let before = sim.nodes[category].x;
		sim.step(CENTER);
		assert!(sim.nodes[category].x < before);
	}

	#[test]
	fn velocity_is_clamped() {
		let mut sim = simulation(&skills(4, 2));
		sim.nodes[2].x = CENTER.0 + 1e6;
		sim.step(CENTER);
		let max_v = sim.config.max_velocity;
		for n in &sim.nodes {
			assert!(n.vx.abs() <= max_v && n.vy.abs() <= max_v);
		}
	}

	#[test]
	fn hit_test_prefers_topmost_node() {
		let mut sim = simulation(&skills(2, 1));
		let (a, b) = (1, 2);
		sim.nodes[a].x = 0.0;
		sim.nodes[a].y = 0.0;
		sim.nodes[b].x = 5.0;
		sim.nodes[b].y = 0.0;
		assert_eq!(sim.node_at(2.0, 0.0), Some(b));
		assert_eq!(sim.node_at(-5000.0, -5000.0), None);
	}

	#[test]
	fn burst_seeding_is_deterministic() {
		let mut config = PhysicsConfig::default();
		config.seeding = Seeding::Burst { spread: 2.0 };
		let tree = build_tree(&skills(10, 3), "Skills").unwrap();
		let a = simulation_for(&tree, config.clone());
		let b = simulation_for(&tree, config);
		for (na, nb) in a.nodes.iter().zip(&b.nodes) {
			assert_eq!((na.x, na.y), (nb.x, nb.y));
			assert!((na.x - CENTER.0).abs() <= 1.0 && (na.y - CENTER.1).abs() <= 1.0);
		}
	}

	#[test]
	fn system_settles_and_short_circuits() {
		let entries: Vec<SkillEntry> = skills(30, 4)
			.into_iter()
			.chain([SkillEntry::new("3D Modelling", "Design").with_children(vec![
				SubSkill::new("Blender"),
				SubSkill::new("Rhino"),
			])])
			.collect();
		let mut sim = simulation(&entries);

		let mut energies = Vec::new();
		for _ in 0..4000 {
			if !sim.step(CENTER) {
				break;
			}
			energies.push(sim.kinetic_energy());
		}
		assert_finite(&sim);
		assert!(sim.is_settled(), "still moving after {} steps", energies.len());

		let window = 50.min(energies.len() / 2).max(1);
		let early: f64 = energies[..window].iter().sum();
		let late: f64 = energies[energies.len() - window..].iter().sum();
		assert!(late <= early);

		// A settled system skips work until something touches it.
		let snapshot: Vec<(f64, f64)> = sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert!(!sim.step(CENTER));
		let after: Vec<(f64, f64)> = sim.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(snapshot, after);

		sim.note_interaction();
		assert!(sim.step(CENTER));
	}

	#[test]
	fn graphs_up_to_two_hundred_nodes_settle() {
		for (count, categories) in [(36, 4), (92, 8), (190, 9)] {
			let mut sim = simulation(&skills(count, categories));
			let steps = (0..6000).take_while(|_| sim.step(CENTER)).count();
			assert!(
				sim.is_settled(),
				"{} nodes still moving after {steps} steps",
				sim.nodes.len()
			);
			assert_finite(&sim);
		}
	}

	#[test]
	fn overlapping_pair_separates_and_comes_to_rest() {
		let mut config = PhysicsConfig::default();
		config.spring_k = 0.0;
		config.charge = 0.0;
		config.center_k_x = 0.0;
		config.center_k_y = 0.0;
		config.tiers.sibling_attraction = 0.0;
		let mut sim = simulation_for(&build_tree(&skills(2, 1), "Skills").unwrap(), config);

		let (a, b) = (2, 3);
		sim.nodes[a].x = 400.0;
		sim.nodes[b].x = 410.0;
		sim.nodes[a].y = 420.0;
		sim.nodes[b].y = 420.0;
		let half_widths = (sim.nodes[a].width + sim.nodes[b].width) / 2.0;

		sim.step(CENTER);
		assert!(sim.nodes[b].x - sim.nodes[a].x > 10.0);

		let steps = (0..2000).take_while(|_| sim.step(CENTER)).count();
		assert!(sim.is_settled(), "pair still moving after {steps} steps");
		assert!(sim.nodes[b].x - sim.nodes[a].x >= half_widths - 1.0);
		assert_eq!(sim.nodes[a].y, sim.nodes[b].y);
	}

	proptest! {
		#[test]
		fn state_stays_finite(count in 0usize..25, categories in 1usize..5, stacked in any::<bool>()) {
			let mut sim = simulation(&skills(count, categories));
			if stacked {
				for node in sim.nodes.iter_mut() {
					node.x = CENTER.0;
					node.y = CENTER.1;
				}
			}
			for _ in 0..60 {
				sim.step(CENTER);
			}
			assert_finite(&sim);
		}
	}
}
