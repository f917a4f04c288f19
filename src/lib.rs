//! highway_planner - per-cycle motion planning for a car on a three-lane highway
//!
//! Each cycle takes the ego state, the unconsumed tail of the previous path
//! and the surrounding traffic, decides lane and target speed, and returns a
//! fixed-length list of map points spaced 0.02 s apart.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Planning modules
pub mod map;
pub mod behavior;
pub mod trajectory;
pub mod planning_cycle;

// Simulator interface
pub mod protocol;
pub mod session;

// Re-export common types for convenience
pub use common::{FrenetPoint, Path2D, Point2D, Pose2D};
pub use common::{PlannerError, PlannerResult};
pub use config::PlannerConfig;
pub use planning_cycle::{CycleInput, CycleOutput, EgoState, PlanningCycle};
pub use session::PlannerSession;
