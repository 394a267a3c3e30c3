//! UI components.

pub mod skills_graph;
