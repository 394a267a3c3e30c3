//! Aggregate tunables for the skills graph.
//!
//! Every section has sensible defaults. A host page may override any subset
//! with a JSON document; missing fields keep their defaults. Overrides are
//! validated before use so a bad value is reported instead of reaching the
//! simulation or the renderer.

use std::fmt;

use serde::Deserialize;

use super::layout::LayoutConfig;
use super::physics::{PhysicsConfig, Seeding};
use super::style::{ScaleBehavior, StyleConfig};
use super::viewport::ViewConfig;

/// Canvas height in CSS pixels when neither the caller nor the config sets one.
pub const DEFAULT_HEIGHT: f64 = 700.0;

/// Every tunable of one graph instance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Initial tidy-tree spacing.
	pub layout: LayoutConfig,
	/// Force simulation coefficients.
	pub physics: PhysicsConfig,
	/// Camera fitting.
	pub view: ViewConfig,
	/// Per-depth sizing of nodes, labels and edges.
	pub style: StyleConfig,
	/// Canvas height in CSS pixels when the caller does not set one.
	pub height: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			layout: LayoutConfig::default(),
			physics: PhysicsConfig::default(),
			view: ViewConfig::default(),
			style: StyleConfig::default(),
			height: DEFAULT_HEIGHT,
		}
	}
}

/// A config document that cannot be used.
#[derive(Debug)]
pub enum ConfigError {
	/// The document is not valid JSON for [`GraphConfig`].
	Parse(serde_json::Error),
	/// A value is outside the range the graph can work with.
	Invalid {
		/// Dotted path of the offending field.
		field: &'static str,
		/// The requirement it breaks.
		reason: &'static str,
	},
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Parse(e) => write!(f, "unreadable graph config: {e}"),
			ConfigError::Invalid { field, reason } => write!(f, "{field} {reason}"),
		}
	}
}

impl std::error::Error for ConfigError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ConfigError::Parse(e) => Some(e),
			ConfigError::Invalid { .. } => None,
		}
	}
}

fn ensure(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
	if ok {
		Ok(())
	} else {
		Err(ConfigError::Invalid { field, reason })
	}
}

fn positive(value: f64, field: &'static str) -> Result<(), ConfigError> {
	ensure(value.is_finite() && value > 0.0, field, "must be positive")
}

fn non_negative(value: f64, field: &'static str) -> Result<(), ConfigError> {
	ensure(value.is_finite() && value >= 0.0, field, "must not be negative")
}

fn damping(value: f64, field: &'static str) -> Result<(), ConfigError> {
	ensure((0.0..1.0).contains(&value), field, "must be in [0, 1)")
}

impl GraphConfig {
	/// Parses and validates a JSON override. A missing or non-positive
	/// height falls back to [`DEFAULT_HEIGHT`].
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let mut config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
		if !(config.height.is_finite() && config.height > 0.0) {
			config.height = DEFAULT_HEIGHT;
		}
		config.validate()?;
		Ok(config)
	}

	/// Checks every range the layout, simulation, camera and renderer rely
	/// on. Reports the first violation.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let layout = &self.layout;
		positive(layout.node_width, "layout.node_width")?;
		positive(layout.node_height, "layout.node_height")?;
		ensure(layout.padding_x.is_finite(), "layout.padding_x", "must be finite")?;

		let physics = &self.physics;
		non_negative(physics.spring_k, "physics.spring_k")?;
		damping(physics.damping, "physics.damping")?;
		non_negative(physics.charge, "physics.charge")?;
		non_negative(physics.center_k_x, "physics.center_k_x")?;
		non_negative(physics.center_k_y, "physics.center_k_y")?;
		positive(physics.max_velocity, "physics.max_velocity")?;
		positive(physics.min_distance_sq, "physics.min_distance_sq")?;
		positive(physics.rest_length_base, "physics.rest_length_base")?;
		positive(physics.rest_length_falloff, "physics.rest_length_falloff")?;
		non_negative(physics.collision_strength, "physics.collision_strength")?;
		non_negative(physics.settle_speed, "physics.settle_speed")?;
		let tiers = &physics.tiers;
		for (value, field) in [
			(tiers.root, "physics.tiers.root"),
			(tiers.category, "physics.tiers.category"),
			(tiers.cross_branch, "physics.tiers.cross_branch"),
			(tiers.sibling_attraction, "physics.tiers.sibling_attraction"),
			(tiers.sibling_separation, "physics.tiers.sibling_separation"),
		] {
			non_negative(value, field)?;
		}
		ensure(
			tiers.is_ordered(),
			"physics.tiers",
			"must keep root > category >= cross_branch > sibling_attraction",
		)?;
		if let Seeding::Burst { spread } = physics.seeding {
			non_negative(spread, "physics.seeding.burst.spread")?;
		}

		let view = &self.view;
		non_negative(view.spring_k, "view.spring_k")?;
		damping(view.damping, "view.damping")?;
		non_negative(view.margin, "view.margin")?;
		positive(view.min_scale, "view.min_scale")?;
		positive(view.max_scale, "view.max_scale")?;
		ensure(
			view.min_scale <= view.max_scale,
			"view.min_scale",
			"must not exceed view.max_scale",
		)?;
		positive(view.converge_epsilon, "view.converge_epsilon")?;
		positive(view.min_world_width, "view.min_world_width")?;
		positive(view.min_world_height, "view.min_world_height")?;

		let style = &self.style;
		non_negative(style.label_padding, "style.label_padding")?;
		positive(style.min_width, "style.min_width")?;
		positive(style.max_width, "style.max_width")?;
		ensure(
			style.min_width <= style.max_width,
			"style.min_width",
			"must not exceed style.max_width",
		)?;
		non_negative(style.root_min_width, "style.root_min_width")?;
		non_negative(style.corner_radius, "style.corner_radius")?;
		ensure(style.edge_bend.is_finite(), "style.edge_bend", "must be finite")?;
		if let ScaleBehavior::Clamped {
			min_screen,
			max_screen,
		} = style.stroke_behavior
		{
			non_negative(min_screen, "style.stroke_behavior.min_screen")?;
			ensure(
				max_screen.is_finite() && min_screen <= max_screen,
				"style.stroke_behavior.min_screen",
				"must not exceed max_screen",
			)?;
		}
		for tier in &style.tiers {
			positive(tier.font_px, "style.tiers.font_px")?;
			positive(tier.node_height, "style.tiers.node_height")?;
			non_negative(tier.stroke_width, "style.tiers.stroke_width")?;
			non_negative(tier.edge_width, "style.tiers.edge_width")?;
			non_negative(tier.halo_width, "style.tiers.halo_width")?;
			ensure(
				(0.0..=1.0).contains(&tier.edge_alpha),
				"style.tiers.edge_alpha",
				"must be in [0, 1]",
			)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rejected_field(json: &str) -> &'static str {
		match GraphConfig::from_json(json) {
			Err(ConfigError::Invalid { field, .. }) => field,
			other => panic!("expected a validation error for {json}, got {other:?}"),
		}
	}

	#[test]
	fn defaults_are_valid() {
		GraphConfig::default().validate().unwrap();
		assert_eq!(GraphConfig::from_json("{}").unwrap(), GraphConfig::default());
	}

	#[test]
	fn partial_overrides_keep_defaults() {
		let config = GraphConfig::from_json(
			r#"{
				"physics": { "damping": 0.85, "tiers": { "root": 9.0 }, "seeding": { "burst": { "spread": 4.0 } } },
				"view": { "max_scale": 2.0 }
			}"#,
		)
		.unwrap();

		assert_eq!(config.physics.damping, 0.85);
		assert_eq!(config.physics.tiers.root, 9.0);
		assert_eq!(config.physics.tiers.category, 2.4);
		assert_eq!(config.physics.seeding, Seeding::Burst { spread: 4.0 });
		assert_eq!(config.physics.charge, PhysicsConfig::default().charge);
		assert_eq!(config.view.max_scale, 2.0);
		assert_eq!(config.layout, LayoutConfig::default());
		assert_eq!(config.height, DEFAULT_HEIGHT);
	}

	#[test]
	fn non_positive_height_falls_back() {
		let config = GraphConfig::from_json(r#"{ "height": -5 }"#).unwrap();
		assert_eq!(config.height, DEFAULT_HEIGHT);
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		assert!(matches!(
			GraphConfig::from_json("{ \"physics\": 3 }"),
			Err(ConfigError::Parse(_))
		));
	}

	#[test]
	fn inverted_ranges_are_rejected() {
		assert_eq!(rejected_field(r#"{ "view": { "min_scale": 2.0 } }"#), "view.min_scale");
		assert_eq!(rejected_field(r#"{ "style": { "min_width": 300 } }"#), "style.min_width");
		assert_eq!(
			rejected_field(
				r#"{ "style": { "stroke_behavior": { "clamped": { "min_screen": 4, "max_screen": 1 } } } }"#
			),
			"style.stroke_behavior.min_screen"
		);
	}

	#[test]
	fn unstable_physics_is_rejected() {
		assert_eq!(
			rejected_field(r#"{ "physics": { "max_velocity": -1 } }"#),
			"physics.max_velocity"
		);
		assert_eq!(
			rejected_field(r#"{ "physics": { "min_distance_sq": 0 } }"#),
			"physics.min_distance_sq"
		);
		assert_eq!(rejected_field(r#"{ "physics": { "damping": 1.0 } }"#), "physics.damping");
		assert_eq!(rejected_field(r#"{ "view": { "damping": 1.2 } }"#), "view.damping");
	}

	#[test]
	fn tier_ordering_is_enforced() {
		assert_eq!(
			rejected_field(r#"{ "physics": { "tiers": { "root": 0.5 } } }"#),
			"physics.tiers"
		);
		assert_eq!(
			rejected_field(r#"{ "physics": { "tiers": { "sibling_attraction": 5.0 } } }"#),
			"physics.tiers"
		);
	}

	#[test]
	fn error_messages_name_the_field() {
		let err = GraphConfig::from_json(r#"{ "view": { "min_scale": 2.0 } }"#).unwrap_err();
		assert_eq!(err.to_string(), "view.min_scale must not exceed view.max_scale");
	}
}
