//! Skill data structures supplied by the host page.

use serde::Deserialize;

/// A categorized skill as listed in the CV data.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SkillEntry {
	/// Display name of the skill.
	pub name: String,
	/// Category the skill is grouped under (e.g. "Cloud Platforms").
	pub category: String,
	/// Optional proficiency, 0 to 100.
	#[serde(default)]
	pub level: Option<u8>,
	/// Optional sub-skills, drawn one level below this skill.
	#[serde(default)]
	pub children: Vec<SubSkill>,
}

/// A nested skill. Inherits its category from the top-level ancestor.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SubSkill {
	/// Display name.
	pub name: String,
	/// Optional proficiency, 0 to 100.
	#[serde(default)]
	pub level: Option<u8>,
	/// Further nesting.
	#[serde(default)]
	pub children: Vec<SubSkill>,
}

impl SkillEntry {
	/// A skill without level or sub-skills.
	pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			category: category.into(),
			level: None,
			children: Vec::new(),
		}
	}

	/// Replaces the sub-skills.
	pub fn with_children(mut self, children: Vec<SubSkill>) -> Self {
		self.children = children;
		self
	}
}

impl SubSkill {
	/// A leaf sub-skill without level.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			level: None,
			children: Vec::new(),
		}
	}
}

/// Complete skill payload as embedded in the page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SkillData {
	/// Flat, categorized skill list.
	pub skills: Vec<SkillEntry>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_nested_skills() {
		let json = r#"{
			"skills": [
				{ "name": "Git", "category": "Version Control", "level": 90 },
				{ "name": "3D Modelling", "category": "Design Tools", "children": [
					{ "name": "Blender", "level": 90 },
					{ "name": "Rhino" }
				]}
			]
		}"#;
		let data: SkillData = serde_json::from_str(json).unwrap();
		assert_eq!(data.skills.len(), 2);
		assert_eq!(data.skills[0].level, Some(90));
		assert_eq!(data.skills[1].children.len(), 2);
		assert_eq!(data.skills[1].children[1].level, None);
	}

	#[test]
	fn missing_category_is_rejected() {
		let json = r#"{ "skills": [ { "name": "Orphan" } ] }"#;
		assert!(serde_json::from_str::<SkillData>(json).is_err());
	}
}
