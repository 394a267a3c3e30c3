//! Depth-tiered visual sizing for graph nodes and edges.
//!
//! Every depth of the hierarchy (root, category, skill, sub-skill) gets its
//! own [`DepthTier`]: label font, node height, stroke and edge weights.
//! Depths past the last tier reuse it.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: simulation coordinates. Node rectangles and label
//!   fonts live here and grow with the camera scale.
//! - **Screen-space**: canvas pixels. Strokes are specified here so outlines
//!   stay crisp however far the camera zooms.

use serde::Deserialize;

/// Defines how a visual property scales with the camera scale `k`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped {
		/// Thinnest on-screen size, pixels.
		min_screen: f64,
		/// Thickest on-screen size, pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value to use after the view transform has been applied.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		let k = k.max(f64::EPSILON);
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Visual weights for one depth of the hierarchy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DepthTier {
	/// Label font size in world units.
	pub font_px: f64,
	/// Bold label font.
	pub bold: bool,
	/// Render the label upper-case.
	pub uppercase: bool,
	/// Node rectangle height in world units.
	pub node_height: f64,
	/// Node outline width in screen pixels.
	pub stroke_width: f64,
	/// Width of edges ending at this depth, screen pixels.
	pub edge_width: f64,
	/// Opacity of edges ending at this depth.
	pub edge_alpha: f64,
	/// Text halo width in screen pixels.
	pub halo_width: f64,
}

/// Complete style configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
	/// Tiers indexed by depth; the last one covers everything deeper.
	pub tiers: Vec<DepthTier>,
	/// CSS font family for every label.
	pub font_family: String,
	/// Horizontal padding added to the measured label width.
	pub label_padding: f64,
	/// Narrowest node rectangle.
	pub min_width: f64,
	/// Widest node rectangle; longer labels overflow it.
	pub max_width: f64,
	/// The root is never narrower than this.
	pub root_min_width: f64,
	/// Corner radius of node rectangles.
	pub corner_radius: f64,
	/// How strokes, edges and halos react to zoom.
	pub stroke_behavior: ScaleBehavior,
	/// Bend applied to an edge per unit of stretch past its rest length.
	pub edge_bend: f64,
}

impl Default for StyleConfig {
	fn default() -> Self {
		Self {
			tiers: vec![
				DepthTier {
					font_px: 15.0,
					bold: true,
					uppercase: true,
					node_height: 36.0,
					stroke_width: 2.0,
					edge_width: 2.0,
					edge_alpha: 0.7,
					halo_width: 4.0,
				},
				DepthTier {
					font_px: 13.0,
					bold: true,
					uppercase: true,
					node_height: 32.0,
					stroke_width: 1.8,
					edge_width: 1.6,
					edge_alpha: 0.55,
					halo_width: 3.5,
				},
				DepthTier {
					font_px: 12.0,
					bold: false,
					uppercase: false,
					node_height: 28.0,
					stroke_width: 1.5,
					edge_width: 1.2,
					edge_alpha: 0.45,
					halo_width: 3.0,
				},
				DepthTier {
					font_px: 11.0,
					bold: false,
					uppercase: false,
					node_height: 24.0,
					stroke_width: 1.2,
					edge_width: 1.0,
					edge_alpha: 0.35,
					halo_width: 2.5,
				},
			],
			font_family: "Inter, ui-sans-serif, system-ui, sans-serif".to_string(),
			label_padding: 24.0,
			min_width: 80.0,
			max_width: 220.0,
			root_min_width: 120.0,
			corner_radius: 8.0,
			stroke_behavior: ScaleBehavior::Screen,
			edge_bend: 12.0,
		}
	}
}

impl StyleConfig {
	/// Tier for `depth`. Deeper nodes reuse the last tier.
	pub fn tier(&self, depth: usize) -> &DepthTier {
		static FALLBACK: DepthTier = DepthTier {
			font_px: 12.0,
			bold: false,
			uppercase: false,
			node_height: 28.0,
			stroke_width: 1.5,
			edge_width: 1.0,
			edge_alpha: 0.4,
			halo_width: 3.0,
		};
		self.tiers
			.get(depth)
			.or_else(|| self.tiers.last())
			.unwrap_or(&FALLBACK)
	}

	/// CSS font for labels at `depth`.
	pub fn font(&self, depth: usize) -> String {
		let tier = self.tier(depth);
		let weight = if tier.bold { "bold " } else { "" };
		format!("{weight}{}px {}", tier.font_px, self.font_family)
	}

	/// Display text for a node name.
	pub fn label(&self, name: &str, depth: usize) -> String {
		if self.tier(depth).uppercase {
			name.to_uppercase()
		} else {
			name.to_string()
		}
	}

	/// Node rectangle for a label of measured `text_width`.
	pub fn node_size(&self, text_width: f64, depth: usize) -> (f64, f64) {
		let mut width = (text_width.ceil() + self.label_padding).clamp(self.min_width, self.max_width);
		if depth == 0 {
			width = width.max(self.root_min_width);
		}
		(width, self.tier(depth).node_height)
	}

	/// Outline width in world units at camera scale `k`.
	pub fn stroke_width(&self, depth: usize, k: f64) -> f64 {
		self.stroke_behavior.apply(self.tier(depth).stroke_width, k)
	}

	/// Width of an edge ending at `target_depth`.
	pub fn edge_width(&self, target_depth: usize, k: f64) -> f64 {
		self.stroke_behavior.apply(self.tier(target_depth).edge_width, k)
	}

	/// Label halo width.
	pub fn halo_width(&self, depth: usize, k: f64) -> f64 {
		self.stroke_behavior.apply(self.tier(depth).halo_width, k)
	}

	/// Sideways bend of an edge, from how far it is stretched.
	pub fn edge_bend(&self, length: f64, rest_length: f64) -> f64 {
		let stretch = (length / rest_length.max(1.0)).clamp(0.6, 1.8);
		(stretch - 1.0) * self.edge_bend
	}
}

/// Rough label width when no canvas is available to measure text.
pub fn estimate_text_width(text: &str, font: &str) -> f64 {
	let px = font
		.split_whitespace()
		.find_map(|part| part.strip_suffix("px")?.parse::<f64>().ok())
		.unwrap_or(12.0);
	text.chars().count() as f64 * px * 0.6
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scale_behaviors() {
		assert_eq!(ScaleBehavior::World.apply(4.0, 2.0), 4.0);
		assert_eq!(ScaleBehavior::Screen.apply(4.0, 2.0), 2.0);
		let clamped = ScaleBehavior::Clamped {
			min_screen: 2.0,
			max_screen: 6.0,
		};
		assert_eq!(clamped.apply(4.0, 0.25), 8.0);
		assert_eq!(clamped.apply(4.0, 1.0), 4.0);
		assert_eq!(clamped.apply(4.0, 3.0), 2.0);
	}

	#[test]
	fn deeper_tiers_are_lighter() {
		let style = StyleConfig::default();
		for depth in 0..3 {
			let (a, b) = (style.tier(depth), style.tier(depth + 1));
			assert!(a.font_px > b.font_px);
			assert!(a.edge_width > b.edge_width);
			assert!(a.edge_alpha > b.edge_alpha);
		}
		assert_eq!(style.tier(9), style.tier(3));
	}

	#[test]
	fn labels_and_fonts_by_depth() {
		let style = StyleConfig::default();
		assert_eq!(style.label("Skills", 0), "SKILLS");
		assert_eq!(style.label("Cloud Platforms", 1), "CLOUD PLATFORMS");
		assert_eq!(style.label("Heroku", 2), "Heroku");
		assert!(style.font(0).starts_with("bold 15px"));
		assert!(style.font(2).starts_with("12px"));
	}

	#[test]
	fn node_width_is_clamped() {
		let style = StyleConfig::default();
		assert_eq!(style.node_size(10.0, 2), (80.0, 28.0));
		assert_eq!(style.node_size(100.2, 2).0, 125.0);
		assert_eq!(style.node_size(1000.0, 2).0, 220.0);
		assert_eq!(style.node_size(10.0, 0), (120.0, 36.0));
	}

	#[test]
	fn edge_bend_follows_stretch() {
		let style = StyleConfig::default();
		assert_eq!(style.edge_bend(100.0, 100.0), 0.0);
		assert!(style.edge_bend(150.0, 100.0) > 0.0);
		assert!(style.edge_bend(10.0, 100.0) < 0.0);
		assert!((style.edge_bend(1000.0, 100.0) - 9.6).abs() < 1e-9);
	}

	#[test]
	fn estimated_width_uses_font_size() {
		assert!((estimate_text_width("abcd", "bold 10px Inter") - 24.0).abs() < 1e-9);
		assert!((estimate_text_width("ab", "serif") - 14.4).abs() < 1e-9);
	}
}
