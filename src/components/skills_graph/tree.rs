//! Builds the rooted skill hierarchy from the flat, categorized skill list.
//!
//! The result is `root -> categories -> skills -> sub-skills`. Every category
//! gets an evenly spaced hue on the color wheel, in first-seen order, and all
//! of its descendants inherit that hue unchanged.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::types::{SkillEntry, SubSkill};

/// A node of the skill hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
	/// Display label.
	pub name: String,
	/// Category hue in degrees. `None` only for the synthetic root.
	pub base_hue: Option<f64>,
	/// Proficiency, 0 to 100.
	pub level: Option<u8>,
	/// Sub-nodes in input order.
	pub children: Vec<TreeNode>,
}

impl TreeNode {
	fn leaf(name: &str, base_hue: f64, level: Option<u8>) -> Self {
		Self {
			name: name.to_string(),
			base_hue: Some(base_hue),
			level,
			children: Vec::new(),
		}
	}

	/// Whether the node has no children.
	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	/// Total number of nodes in this subtree, including `self`.
	pub fn node_count(&self) -> usize {
		1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
	}
}

/// Rejected skill input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkillDataError {
	/// A skill or sub-skill has an empty name.
	BlankName {
		/// Category the nameless skill was listed under.
		category: String,
	},
	/// A top-level skill has an empty category.
	BlankCategory { skill: String },
}

impl fmt::Display for SkillDataError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SkillDataError::BlankName { category } => {
				write!(f, "skill with empty name in category {category:?}")
			}
			SkillDataError::BlankCategory { skill } => {
				write!(f, "skill {skill:?} has an empty category")
			}
		}
	}
}

impl std::error::Error for SkillDataError {}

/// Hue for the `index`-th of `total` categories: `index / total * 360`.
pub fn category_hue(index: usize, total: usize) -> f64 {
	if total == 0 {
		return 0.0;
	}
	index as f64 / total as f64 * 360.0
}

/// Unique category names in first-seen order, paired with their hue.
pub fn category_hues(entries: &[SkillEntry]) -> Vec<(String, f64)> {
	let mut order: Vec<&str> = Vec::new();
	for entry in entries {
		if !order.contains(&entry.category.as_str()) {
			order.push(&entry.category);
		}
	}
	let total = order.len();
	order
		.into_iter()
		.enumerate()
		.map(|(i, name)| (name.to_string(), category_hue(i, total)))
		.collect()
}

/// Builds the hierarchy rooted at a node labelled `root_label`.
///
/// Empty input yields a root with no children. Entries with a blank name or
/// category are rejected with the first offending entry.
pub fn build_tree(entries: &[SkillEntry], root_label: &str) -> Result<TreeNode, SkillDataError> {
	validate(entries)?;

	let hues = category_hues(entries);
	let mut categories: Vec<TreeNode> = hues
		.iter()
		.map(|(name, hue)| TreeNode {
			name: name.clone(),
			base_hue: Some(*hue),
			level: None,
			children: Vec::new(),
		})
		.collect();
	let slot: HashMap<&str, usize> = hues
		.iter()
		.enumerate()
		.map(|(i, (name, _))| (name.as_str(), i))
		.collect();

	for entry in entries {
		let category = &mut categories[slot[entry.category.as_str()]];
		let hue = category.base_hue.unwrap_or_default();
		let mut skill = TreeNode::leaf(&entry.name, hue, entry.level);
		skill.children = entry.children.iter().map(|c| sub_skill(c, hue)).collect();
		category.children.push(skill);
	}

	let root = TreeNode {
		name: root_label.to_string(),
		base_hue: None,
		level: None,
		children: categories,
	};
	debug!(
		"skills-graph: built tree with {} categories, {} nodes",
		root.children.len(),
		root.node_count()
	);
	Ok(root)
}

fn sub_skill(skill: &SubSkill, hue: f64) -> TreeNode {
	let mut node = TreeNode::leaf(&skill.name, hue, skill.level);
	node.children = skill.children.iter().map(|c| sub_skill(c, hue)).collect();
	node
}

fn validate(entries: &[SkillEntry]) -> Result<(), SkillDataError> {
	fn check_children(children: &[SubSkill], category: &str) -> Result<(), SkillDataError> {
		for child in children {
			if child.name.trim().is_empty() {
				return Err(SkillDataError::BlankName {
					category: category.to_string(),
				});
			}
			check_children(&child.children, category)?;
		}
		Ok(())
	}

	for entry in entries {
		if entry.category.trim().is_empty() {
			return Err(SkillDataError::BlankCategory {
				skill: entry.name.clone(),
			});
		}
		if entry.name.trim().is_empty() {
			return Err(SkillDataError::BlankName {
				category: entry.category.clone(),
			});
		}
		check_children(&entry.children, &entry.category)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn names(node: &TreeNode) -> Vec<&str> {
		node.children.iter().map(|c| c.name.as_str()).collect()
	}

	fn assert_hue_below(node: &TreeNode, hue: Option<f64>) {
		assert_eq!(node.base_hue, hue, "hue mismatch at {}", node.name);
		for child in &node.children {
			assert_hue_below(child, hue);
		}
	}

	#[test]
	fn single_category() {
		let entries = [SkillEntry::new("A", "X"), SkillEntry::new("B", "X")];
		let root = build_tree(&entries, "Skills").unwrap();

		assert_eq!(root.name, "Skills");
		assert_eq!(root.base_hue, None);
		assert_eq!(names(&root), ["X"]);
		let x = &root.children[0];
		assert_eq!(names(x), ["A", "B"]);
		assert_eq!(x.children[0].base_hue, x.children[1].base_hue);
	}

	#[test]
	fn two_categories_split_the_wheel() {
		let entries = [
			SkillEntry::new("A", "X"),
			SkillEntry::new("B", "Y"),
			SkillEntry::new("C", "X"),
		];
		let root = build_tree(&entries, "Skills").unwrap();

		assert_eq!(names(&root), ["X", "Y"]);
		assert_eq!(root.children[0].base_hue, Some(0.0));
		assert_eq!(root.children[1].base_hue, Some(180.0));
		assert_eq!(names(&root.children[0]), ["A", "C"]);
	}

	#[test]
	fn nested_children_inherit_category_hue() {
		let entries = [
			SkillEntry::new("Git", "Version Control"),
			SkillEntry::new("3D Modelling", "Design Tools").with_children(vec![
				SubSkill::new("Blender"),
				SubSkill {
					children: vec![SubSkill::new("Grasshopper")],
					..SubSkill::new("Rhino")
				},
			]),
		];
		let root = build_tree(&entries, "Skills").unwrap();
		let design = &root.children[1];

		assert_eq!(design.base_hue, Some(180.0));
		assert_hue_below(design, Some(180.0));
		assert_eq!(root.node_count(), 8);
	}

	#[test]
	fn empty_input_is_root_only() {
		let root = build_tree(&[], "Ada Lovelace").unwrap();
		assert_eq!(root.name, "Ada Lovelace");
		assert!(root.is_leaf());
		assert_eq!(root.node_count(), 1);
	}

	#[test]
	fn blank_category_is_rejected() {
		let entries = [SkillEntry::new("A", "X"), SkillEntry::new("B", "  ")];
		assert_eq!(
			build_tree(&entries, "Skills"),
			Err(SkillDataError::BlankCategory { skill: "B".into() })
		);
	}

	#[test]
	fn blank_sub_skill_name_is_rejected() {
		let entries = [SkillEntry::new("A", "X").with_children(vec![SubSkill::new("")])];
		assert!(matches!(
			build_tree(&entries, "Skills"),
			Err(SkillDataError::BlankName { .. })
		));
	}

	fn arb_entries() -> impl Strategy<Value = Vec<SkillEntry>> {
		prop::collection::vec(("[a-z]{1,6}", "[A-E]"), 0..40).prop_map(|pairs| {
			pairs
				.into_iter()
				.map(|(name, category)| SkillEntry::new(name, category))
				.collect()
		})
	}

	proptest! {
		#[test]
		fn building_is_deterministic(entries in arb_entries()) {
			let a = build_tree(&entries, "Skills").unwrap();
			let b = build_tree(&entries, "Skills").unwrap();
			prop_assert_eq!(a, b);
		}

		#[test]
		fn every_descendant_shares_its_category_hue(entries in arb_entries()) {
			let root = build_tree(&entries, "Skills").unwrap();
			let total = root.children.len();
			for (i, category) in root.children.iter().enumerate() {
				prop_assert_eq!(category.base_hue, Some(category_hue(i, total)));
				assert_hue_below(category, category.base_hue);
			}
		}
	}
}
