//! Common types and error definitions for highway_planner
//!
//! This module provides the foundational building blocks used across
//! the map, behavior and trajectory layers.

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
