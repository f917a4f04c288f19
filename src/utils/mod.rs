//! Utility modules for highway_planner

pub mod visualization;

pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
