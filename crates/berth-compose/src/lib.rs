//! # berth-compose
//!
//! Planning core for multi-container applications.
//!
//! Handles:
//! - **Config**: Container descriptors and named groups loaded from YAML/JSON.
//! - **Dependencies**: Per-container relationships tagged by kind.
//! - **Graph**: The dependency graph, topological ordering, and DOT export.
//! - **Target**: Turning a user reference into a concrete set of containers.
//! - **Unit of work**: Closure, ordering, and must-run classification.
//! - **Action**: Per-command dispatch of a unit of work onto a driver.

pub mod action;
pub mod config;
pub mod dependencies;
pub mod graph;
pub mod target;
pub mod unit_of_work;
