//! # berth-common
//!
//! Shared error definitions and constants used across the berth workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate.

pub mod constants;
pub mod error;
