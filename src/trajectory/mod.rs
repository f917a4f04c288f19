// Trajectory synthesis: spline fitting and path generation

pub mod cubic_spline;
pub mod generator;

pub use cubic_spline::CubicSpline;
pub use generator::{TrajectoryGenerator, TrajectoryRequest};
