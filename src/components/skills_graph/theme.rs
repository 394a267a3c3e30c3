//! Visual theming for the skills graph.
//!
//! Palettes for the host page's light and dark modes, plus the coloring
//! function that derives node and edge colors from category hue, depth and
//! motion. The coloring function is pure: the same inputs always produce the
//! same color.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Builds a color from hue (degrees, any range), saturation and
	/// lightness (both percentages).
	pub fn hsl(h: f64, s: f64, l: f64) -> Self {
		let h = h.rem_euclid(360.0) / 360.0;
		let s = (s / 100.0).clamp(0.0, 1.0);
		let l = (l / 100.0).clamp(0.0, 1.0);

		if s == 0.0 {
			let v = (l * 255.0).round() as u8;
			return Self::rgb(v, v, v);
		}

		let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
		let p = 2.0 * l - q;
		let channel = |t: f64| {
			let t = t.rem_euclid(1.0);
			let v = if t < 1.0 / 6.0 {
				p + (q - p) * 6.0 * t
			} else if t < 0.5 {
				q
			} else if t < 2.0 / 3.0 {
				p + (q - p) * (2.0 / 3.0 - t) * 6.0
			} else {
				p
			};
			(v * 255.0).round().clamp(0.0, 255.0) as u8
		};
		Self::rgb(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
	}

	/// Same color, different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// CSS color: hex when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Host page color mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
	/// Dark text on a light background.
	Light,
	/// Light text on a dark background.
	#[default]
	Dark,
}

impl ColorMode {
	/// Parses a `data-theme` style value. Unknown values yield `None` so the
	/// caller can fall back to the system preference.
	pub fn from_attr(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"light" => Some(ColorMode::Light),
			"dark" => Some(ColorMode::Dark),
			_ => None,
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	/// Mode this palette belongs to.
	pub mode: ColorMode,
	/// Canvas fill behind the graph.
	pub background: Color,
	/// Label color.
	pub text: Color,
	/// Hairline color, used for level bar tracks.
	pub border: Color,
	/// Highlight color for the root node.
	pub accent: Color,
	/// Outline drawn behind label text.
	pub halo: Color,
	/// Saturation of category colors, percent.
	pub saturation: f64,
	/// Lightness of category nodes, percent; deeper nodes shift from here.
	pub lightness: f64,
	/// Lightness change per depth below the categories.
	pub lightness_step: f64,
	/// Extra saturation at full speed.
	pub motion_saturation: f64,
	/// Amplitude of the slow hue drift, degrees.
	pub hue_drift: f64,
	/// Opacity of node fills.
	pub fill_alpha: f64,
}

impl Theme {
	/// Palette for a light page.
	pub fn light() -> Self {
		Self {
			mode: ColorMode::Light,
			background: Color::rgb(255, 255, 255),
			text: Color::rgb(24, 24, 27),
			border: Color::rgba(0, 0, 0, 0.1),
			accent: Color::rgb(37, 99, 235),
			halo: Color::rgba(255, 255, 255, 0.9),
			saturation: 70.0,
			lightness: 42.0,
			lightness_step: 6.0,
			motion_saturation: 20.0,
			hue_drift: 6.0,
			fill_alpha: 0.1,
		}
	}

	/// Palette for a dark page.
	pub fn dark() -> Self {
		Self {
			mode: ColorMode::Dark,
			background: Color::rgb(9, 9, 11),
			text: Color::rgb(244, 244, 245),
			border: Color::rgba(255, 255, 255, 0.1),
			accent: Color::rgb(59, 130, 246),
			halo: Color::rgba(9, 9, 11, 0.85),
			saturation: 75.0,
			lightness: 62.0,
			lightness_step: -5.0,
			motion_saturation: 20.0,
			hue_drift: 6.0,
			fill_alpha: 0.14,
		}
	}

	/// Palette matching `mode`.
	pub fn for_mode(mode: ColorMode) -> Self {
		match mode {
			ColorMode::Light => Self::light(),
			ColorMode::Dark => Self::dark(),
		}
	}

	/// Node color from its index, elapsed seconds, normalized speed
	/// (`0..=1`), depth and category hue.
	///
	/// The root has no hue and always gets the accent color.
	pub fn node_color(
		&self,
		index: usize,
		elapsed: f64,
		velocity_factor: f64,
		depth: usize,
		base_hue: Option<f64>,
	) -> Color {
		let Some(base_hue) = base_hue else {
			return self.accent;
		};
		let motion = velocity_factor.clamp(0.0, 1.0);
		let drift = (elapsed * 0.35 + index as f64 * 0.7).sin() * self.hue_drift;
		let below_category = depth.saturating_sub(1) as f64;
		let lightness = self.lightness + below_category * self.lightness_step;
		let saturation = self.saturation - below_category * 8.0 + motion * self.motion_saturation;
		Color::hsl(base_hue + drift, saturation, lightness)
	}

	/// Edge color: the target node's color at the edge's depth opacity.
	pub fn edge_color(&self, target: Color, alpha: f64) -> Color {
		target.with_alpha(alpha)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hsl_primaries() {
		assert_eq!(Color::hsl(0.0, 100.0, 50.0), Color::rgb(255, 0, 0));
		assert_eq!(Color::hsl(120.0, 100.0, 50.0), Color::rgb(0, 255, 0));
		assert_eq!(Color::hsl(240.0, 100.0, 50.0), Color::rgb(0, 0, 255));
		assert_eq!(Color::hsl(-120.0, 100.0, 50.0), Color::rgb(0, 0, 255));
		assert_eq!(Color::hsl(42.0, 0.0, 100.0), Color::rgb(255, 255, 255));
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 8, 0).to_css(), "#ff0800");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn node_color_is_pure() {
		let theme = Theme::dark();
		let a = theme.node_color(3, 1.25, 0.4, 2, Some(180.0));
		let b = theme.node_color(3, 1.25, 0.4, 2, Some(180.0));
		assert_eq!(a, b);
		assert_ne!(a, theme.node_color(3, 1.25, 0.4, 2, Some(0.0)));
	}

	#[test]
	fn border_is_a_faint_contrasting_hairline() {
		for theme in [Theme::light(), Theme::dark()] {
			let luma = |c: Color| u32::from(c.r) + u32::from(c.g) + u32::from(c.b);
			assert!(theme.border.a < 0.5);
			assert!(luma(theme.border).abs_diff(luma(theme.background)) > 300);
		}
	}

	#[test]
	fn root_uses_accent() {
		let theme = Theme::light();
		assert_eq!(theme.node_color(0, 9.0, 1.0, 0, None), theme.accent);
	}

	#[test]
	fn motion_raises_saturation() {
		let theme = Theme::dark();
		let still = theme.node_color(1, 0.0, 0.0, 1, Some(200.0));
		let moving = theme.node_color(1, 0.0, 1.0, 1, Some(200.0));
		let spread = |c: Color| c.r.max(c.g).max(c.b) - c.r.min(c.g).min(c.b);
		assert!(spread(moving) > spread(still));
	}

	#[test]
	fn color_mode_parsing() {
		assert_eq!(ColorMode::from_attr(" Dark "), Some(ColorMode::Dark));
		assert_eq!(ColorMode::from_attr("light"), Some(ColorMode::Light));
		assert_eq!(ColorMode::from_attr("auto"), None);
		assert_eq!(Theme::for_mode(ColorMode::Light).mode, ColorMode::Light);
	}
}
