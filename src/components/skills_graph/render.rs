//! Canvas rendering for the skills graph.
//!
//! Drawing happens in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, bent by how far they are stretched (world space)
//! 3. Nodes in index order, so later nodes sit on top and match hit-testing
//! 4. Labels with a halo, then the proficiency bar for leaves

use web_sys::CanvasRenderingContext2d;

use super::physics::SimNode;
use super::state::SkillsGraphState;
use super::theme::Color;

fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// Renders one frame. `dpr` is the device pixel ratio the canvas backing
/// store was sized with.
pub fn render(state: &SkillsGraphState, ctx: &CanvasRenderingContext2d, dpr: f64) {
	let colors = node_colors(state);

	let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
	draw_background(state, ctx);

	ctx.save();
	let view = &state.view;
	let _ = ctx.translate(view.x, view.y);
	let _ = ctx.scale(view.scale, view.scale);

	draw_edges(state, ctx, &colors);
	for (idx, node) in state.sim.nodes.iter().enumerate() {
		draw_node(state, ctx, idx, node, colors[idx]);
	}

	ctx.restore();
}

/// Per-frame node colors. Faster nodes render more saturated.
fn node_colors(state: &SkillsGraphState) -> Vec<Color> {
	let max_v = state.sim.config.max_velocity.max(f64::EPSILON);
	state
		.sim
		.nodes
		.iter()
		.enumerate()
		.map(|(idx, node)| {
			state.theme.node_color(
				idx,
				state.elapsed,
				node.speed() / max_v,
				node.depth,
				node.base_hue,
			)
		})
		.collect()
}

fn draw_background(state: &SkillsGraphState, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (state.viewport.width, state.viewport.height);
	ctx.clear_rect(0.0, 0.0, w, h);
	ctx.set_fill_style_str(&state.theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_edges(state: &SkillsGraphState, ctx: &CanvasRenderingContext2d, colors: &[Color]) {
	let k = state.view.scale;
	let (cx, cy) = state.center();
	ctx.set_line_cap("round");

	for edge in &state.sim.edges {
		let (s, t) = (&state.sim.nodes[edge.source], &state.sim.nodes[edge.target]);
		let (dx, dy) = (t.x - s.x, t.y - s.y);
		let length = dx.hypot(dy);
		if length < 0.001 {
			continue;
		}

		let emphasis = smooth_step(
			state
				.highlight
				.intensity(edge.source)
				.min(state.highlight.intensity(edge.target)),
		);
		let tier = state.style.tier(t.depth);
		let alpha = (tier.edge_alpha + (1.0 - tier.edge_alpha) * 0.6 * emphasis).min(1.0);
		let width = state.style.edge_width(t.depth, k) * (1.0 + 0.8 * emphasis);
		let color = state.theme.edge_color(colors[edge.target], alpha);

		// Bend sideways, toward the center of the view.
		let (mx, my) = ((s.x + t.x) / 2.0, (s.y + t.y) / 2.0);
		let (mut nx, mut ny) = (-dy / length, dx / length);
		if nx * (cx - mx) + ny * (cy - my) < 0.0 {
			nx = -nx;
			ny = -ny;
		}
		let bend = state.style.edge_bend(length, edge.rest_length);

		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(s.x, s.y);
		if bend.abs() > 0.5 {
			ctx.quadratic_curve_to(mx + nx * bend, my + ny * bend, t.x, t.y);
		} else {
			ctx.line_to(t.x, t.y);
		}
		ctx.stroke();
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_node(
	state: &SkillsGraphState,
	ctx: &CanvasRenderingContext2d,
	idx: usize,
	node: &SimNode,
	color: Color,
) {
	let style = &state.style;
	let theme = &state.theme;
	let k = state.view.scale;
	let emphasis = smooth_step(state.highlight.intensity(idx));
	let (left, top) = (node.x - node.width / 2.0, node.y - node.height / 2.0);

	rounded_rect(ctx, left, top, node.width, node.height, style.corner_radius);
	let fill = if node.is_root() {
		theme.accent.with_alpha(theme.fill_alpha * 1.5)
	} else {
		color.with_alpha(theme.fill_alpha + 0.12 * emphasis)
	};
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill();
	ctx.set_fill_style_str(&fill.to_css());
	ctx.fill();

	let stroke = style.stroke_width(node.depth, k);
	ctx.set_stroke_style_str(&color.with_alpha(0.55 + 0.45 * emphasis).to_css());
	ctx.set_line_width(stroke * (1.0 + 0.5 * emphasis));
	ctx.stroke();

	if state.highlight.hovered == Some(idx) {
		rounded_rect(
			ctx,
			left - stroke * 2.0,
			top - stroke * 2.0,
			node.width + stroke * 4.0,
			node.height + stroke * 4.0,
			style.corner_radius + stroke * 2.0,
		);
		ctx.set_stroke_style_str(&theme.accent.to_css());
		ctx.set_line_width(stroke * 1.5);
		ctx.stroke();
	}

	draw_label(state, ctx, node, color, emphasis);
	if let Some(level) = node.level {
		draw_level_bar(ctx, node, level, color, theme.border);
	}
}

fn draw_label(
	state: &SkillsGraphState,
	ctx: &CanvasRenderingContext2d,
	node: &SimNode,
	color: Color,
	emphasis: f64,
) {
	let style = &state.style;
	let theme = &state.theme;
	let text_y = if node.level.is_some() {
		node.y - 2.0
	} else {
		node.y
	};

	ctx.set_font(&style.font(node.depth));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	ctx.set_line_join("round");
	ctx.set_line_width(style.halo_width(node.depth, state.view.scale));
	ctx.set_stroke_style_str(&theme.halo.to_css());
	let _ = ctx.stroke_text(&node.label, node.x, text_y);

	let text = if node.is_root() {
		theme.accent
	} else {
		theme.text.lerp(color, 0.35 * emphasis)
	};
	ctx.set_fill_style_str(&text.to_css());
	let _ = ctx.fill_text(&node.label, node.x, text_y);
}

/// Thin proficiency bar along the bottom edge of the node.
fn draw_level_bar(
	ctx: &CanvasRenderingContext2d,
	node: &SimNode,
	level: u8,
	color: Color,
	track_color: Color,
) {
	const INSET: f64 = 10.0;
	const THICKNESS: f64 = 2.0;
	let track = (node.width - INSET * 2.0).max(0.0);
	let fraction = f64::from(level.min(100)) / 100.0;
	let (x, y) = (
		node.x - track / 2.0,
		node.y + node.height / 2.0 - INSET / 2.0 - THICKNESS,
	);

	ctx.set_fill_style_str(&track_color.to_css());
	ctx.fill_rect(x, y, track, THICKNESS);
	ctx.set_fill_style_str(&color.with_alpha(0.9).to_css());
	ctx.fill_rect(x, y, track * fraction, THICKNESS);
}
