//! Tidy-tree placement of the skill hierarchy.
//!
//! A single depth-first pass: leaves take the next free horizontal slot at
//! their depth, internal nodes sit at the midpoint of their leftmost and
//! rightmost child. Afterwards the whole layout is shifted so the leftmost
//! node lands on `padding_x`. The result is a pure function of the tree and
//! the [`LayoutConfig`], which keeps simulation seeding reproducible.

use serde::Deserialize;

use super::tree::TreeNode;

/// Spacing used by [`layout_tree`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Horizontal distance between adjacent leaf slots.
	pub node_width: f64,
	/// Vertical distance between depth rows.
	pub node_height: f64,
	/// Left edge the layout is normalized to.
	pub padding_x: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_width: 160.0,
			node_height: 60.0,
			padding_x: 40.0,
		}
	}
}

/// A placed node. Indices refer into [`TreeLayout::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
	/// Label of the tree node.
	pub name: String,
	/// Inherited category hue. `None` for the root.
	pub base_hue: Option<f64>,
	/// Proficiency, 0 to 100.
	pub level: Option<u8>,
	/// Distance from the root.
	pub depth: usize,
	/// Horizontal slot position.
	pub x: f64,
	/// Row position, `depth * node_height`.
	pub y: f64,
	/// Parent index. `None` for the root.
	pub parent: Option<usize>,
	/// Child indices in input order.
	pub children: Vec<usize>,
}

impl LayoutNode {
	/// Whether the node has no children.
	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}
}

/// Output of [`layout_tree`]: an arena of nodes in pre-order plus the
/// parent-to-child edges, in creation order.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeLayout {
	/// Placed nodes in pre-order.
	pub nodes: Vec<LayoutNode>,
	/// `(parent, child)` index pairs.
	pub edges: Vec<(usize, usize)>,
	/// Index of the root, always 0.
	pub root: usize,
}

impl TreeLayout {
	/// Child indices of `idx`.
	pub fn children_of(&self, idx: usize) -> &[usize] {
		&self.nodes[idx].children
	}

	/// Leaf indices at `depth`, in traversal order.
	pub fn leaves_at_depth(&self, depth: usize) -> Vec<usize> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.depth == depth && n.is_leaf())
			.map(|(i, _)| i)
			.collect()
	}

	/// Depth of the deepest node.
	pub fn max_depth(&self) -> usize {
		self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
	}
}

struct Walker<'a> {
	config: &'a LayoutConfig,
	nodes: Vec<LayoutNode>,
	edges: Vec<(usize, usize)>,
	/// Next free leaf slot per depth.
	slots: Vec<usize>,
}

impl Walker<'_> {
	fn walk(&mut self, tree: &TreeNode, depth: usize, parent: Option<usize>) -> usize {
		let idx = self.nodes.len();
		self.nodes.push(LayoutNode {
			name: tree.name.clone(),
			base_hue: tree.base_hue,
			level: tree.level,
			depth,
			x: 0.0,
			y: depth as f64 * self.config.node_height,
			parent,
			children: Vec::with_capacity(tree.children.len()),
		});
		if let Some(p) = parent {
			self.edges.push((p, idx));
			self.nodes[p].children.push(idx);
		}

		if tree.is_leaf() {
			if self.slots.len() <= depth {
				self.slots.resize(depth + 1, 0);
			}
			let slot = self.slots[depth];
			self.slots[depth] += 1;
			self.nodes[idx].x = slot as f64 * self.config.node_width;
		} else {
			let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
			for child in &tree.children {
				let c = self.walk(child, depth + 1, Some(idx));
				min_x = min_x.min(self.nodes[c].x);
				max_x = max_x.max(self.nodes[c].x);
			}
			self.nodes[idx].x = (min_x + max_x) / 2.0;
		}
		idx
	}
}

/// Places every node of `root`. See the module docs for the rules.
pub fn layout_tree(root: &TreeNode, config: &LayoutConfig) -> TreeLayout {
	let mut walker = Walker {
		config,
		nodes: Vec::with_capacity(root.node_count()),
		edges: Vec::new(),
		slots: Vec::new(),
	};
	let root_idx = walker.walk(root, 0, None);

	let min_x = walker
		.nodes
		.iter()
		.map(|n| n.x)
		.fold(f64::INFINITY, f64::min);
	for node in &mut walker.nodes {
		node.x = node.x - min_x + config.padding_x;
	}

	TreeLayout {
		nodes: walker.nodes,
		edges: walker.edges,
		root: root_idx,
	}
}
