//! skills-graph: animated skills taxonomy for a portfolio page.
//!
//! This crate provides a WASM canvas component that turns a flat list of
//! skills into a category tree, lays it out and keeps it moving with a small
//! force simulation. Skill data and optional tuning are read from JSON script
//! elements embedded in the host page.

use anyhow::{Context, Result, anyhow};
use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlScriptElement};

pub mod components;

pub use components::skills_graph::{
	ColorMode, GraphConfig, SkillData, SkillEntry, SkillsGraphCanvas, SubSkill,
};

/// Id of the script element holding the skill list.
pub const SKILLS_DATA_ID: &str = "skills-data";
/// Id of the optional script element holding a [`GraphConfig`] override.
pub const GRAPH_CONFIG_ID: &str = "skills-graph-config";
/// Viewport width below which the compact root label is used.
const COMPACT_BREAKPOINT: f64 = 640.0;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("skills-graph: logging initialized");
}

fn script_element(id: &str) -> Result<HtmlScriptElement> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| anyhow!("no document"))?;
	let element = document
		.get_element_by_id(id)
		.with_context(|| format!("no element with id \"{id}\""))?;
	element
		.dyn_into::<HtmlScriptElement>()
		.map_err(|_| anyhow!("element \"{id}\" is not a script"))
}

/// Logs a failed DOM call at debug level and discards the error.
pub(crate) fn log_dom_failure<T, E: std::fmt::Debug>(
	result: Result<T, E>,
	what: &str,
) -> Option<T> {
	match result {
		Ok(value) => Some(value),
		Err(e) => {
			debug!("skills-graph: {what} failed: {e:?}");
			None
		}
	}
}

fn script_text(script: &HtmlScriptElement) -> Result<String> {
	script
		.text()
		.map_err(|e| anyhow!("unable to read script text: {e:?}"))
}

/// Parses the embedded skill payload. Accepts either `{ "skills": [...] }`
/// or a bare array of entries.
pub fn parse_skill_data(json: &str) -> Result<Vec<SkillEntry>> {
	let value: serde_json::Value = serde_json::from_str(json).context("skill data is not JSON")?;
	let entries = if value.is_array() {
		serde_json::from_value::<Vec<SkillEntry>>(value)
	} else {
		serde_json::from_value::<SkillData>(value).map(|data| data.skills)
	}
	.context("malformed skill entry")?;
	Ok(entries)
}

/// Parses and validates a tuning override. Out-of-range values are errors,
/// not clamped, so a typo never reaches the simulation.
pub fn parse_graph_config(json: &str) -> Result<GraphConfig> {
	GraphConfig::from_json(json).context("unusable graph config")
}

/// Load skill entries from the script element with id="skills-data".
pub fn load_skill_data() -> Result<Vec<SkillEntry>> {
	let script = script_element(SKILLS_DATA_ID)?;
	let entries = parse_skill_data(&script_text(&script)?)?;
	info!("skills-graph: loaded {} skill entries", entries.len());
	Ok(entries)
}

/// Load tuning overrides from id="skills-graph-config", falling back to
/// defaults when the element is absent or unreadable.
pub fn load_graph_config() -> GraphConfig {
	let Ok(script) = script_element(GRAPH_CONFIG_ID) else {
		return GraphConfig::default();
	};
	let parsed = script_text(&script).and_then(|json| parse_graph_config(&json));
	match parsed {
		Ok(config) => {
			info!("skills-graph: using graph config from page");
			config
		}
		Err(e) => {
			warn!("skills-graph: {e:#}, using defaults");
			GraphConfig::default()
		}
	}
}

fn document_element() -> Option<Element> {
	web_sys::window()?.document()?.document_element()
}

/// Color mode from the page's `data-theme` attribute, or the system
/// preference when the page does not set one.
pub fn initial_color_mode() -> ColorMode {
	if let Some(mode) = document_element()
		.and_then(|root| root.get_attribute("data-theme"))
		.and_then(|value| ColorMode::from_attr(&value))
	{
		return mode;
	}
	let prefers_light = web_sys::window()
		.and_then(|w| w.match_media("(prefers-color-scheme: light)").ok().flatten())
		.map(|query| query.matches())
		.unwrap_or(false);
	if prefers_light {
		ColorMode::Light
	} else {
		ColorMode::Dark
	}
}

fn apply_color_mode(mode: ColorMode) {
	if let Some(root) = document_element() {
		let value = match mode {
			ColorMode::Light => "light",
			ColorMode::Dark => "dark",
		};
		log_dom_failure(root.set_attribute("data-theme", value), "setting data-theme");
	}
}

/// Root label and reserved chrome width, read from `data-*` attributes on
/// the skills script.
fn presentation() -> (String, f64) {
	let script = script_element(SKILLS_DATA_ID).ok();
	let attr = |name: &str| script.as_ref().and_then(|s| s.get_attribute(name));

	let compact = web_sys::window()
		.and_then(|w| w.inner_width().ok())
		.and_then(|w| w.as_f64())
		.is_some_and(|w| w < COMPACT_BREAKPOINT);
	let label = compact
		.then(|| attr("data-compact-label"))
		.flatten()
		.or_else(|| attr("data-root-label"))
		.unwrap_or_else(|| "Skills".to_string());
	let reserved = attr("data-reserved-width")
		.and_then(|v| v.trim().parse::<f64>().ok())
		.filter(|w| w.is_finite() && *w >= 0.0)
		.unwrap_or(0.0);
	(label, reserved)
}

/// Main application component.
/// Loads skills from the DOM and renders the animated graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let skills = load_skill_data().unwrap_or_else(|e| {
		warn!("skills-graph: {e:#}, showing an empty graph");
		Vec::new()
	});
	let config = load_graph_config();
	let (root_label, reserved_width) = presentation();

	let mode = RwSignal::new(initial_color_mode());
	Effect::new(move |_| apply_color_mode(mode.get()));
	let toggle = move |_: web_sys::MouseEvent| {
		mode.update(|m| {
			*m = match *m {
				ColorMode::Light => ColorMode::Dark,
				ColorMode::Dark => ColorMode::Light,
			}
		})
	};

	view! {
		<Title text="Skills" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<section class="skills-graph">
			<SkillsGraphCanvas
				skills=Signal::stored(skills)
				root_label=root_label
				color_mode=mode
				reserved_width=reserved_width
				config=Some(config)
			/>
			<div class="graph-overlay">
				<p class="subtitle">"Drag a skill to pull it around."</p>
				<button class="theme-toggle" on:click=toggle>
					{move || match mode.get() {
						ColorMode::Light => "Dark mode",
						ColorMode::Dark => "Light mode",
					}}
				</button>
			</div>
		</section>
	}
}
