//! Animated skills taxonomy visualization.
//!
//! A flat list of skill entries becomes a three-level tree (root, categories,
//! skills, plus any nested sub-skills), is laid out once as a tidy tree and
//! then handed to a small force simulation that keeps running while the
//! canvas is visible:
//! - Springs along parent/child edges, tiered repulsion between all pairs
//! - A soft overlap penalty so labels do not stack
//! - A camera that springs toward a fit of all nodes
//! - Drag to pin a node, release to let it settle again
//! - Optional WebGL lens blur driven by the system's energy
//!
//! # Example
//!
//! ```ignore
//! use skills_graph::{ColorMode, SkillEntry, SkillsGraphCanvas};
//!
//! let skills = vec![
//!     SkillEntry::new("Rust", "Languages"),
//!     SkillEntry::new("Postgres", "Storage"),
//! ];
//!
//! view! {
//!     <SkillsGraphCanvas
//!         skills=Signal::stored(skills)
//!         color_mode=ColorMode::Light
//!         reserved_width=240.0
//!     />
//! }
//! ```

mod component;
pub mod config;
pub mod layout;
pub mod physics;
mod postprocess;
mod render;
mod state;
pub mod style;
pub mod theme;
mod ticker;
pub mod tree;
pub mod types;
pub mod viewport;

pub use component::SkillsGraphCanvas;
pub use config::{ConfigError, GraphConfig};
pub use theme::{ColorMode, Theme};
pub use tree::{SkillDataError, build_tree};
pub use types::{SkillData, SkillEntry, SubSkill};
