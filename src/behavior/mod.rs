//! Behavior layer: lanes, traffic, safety and the lane selection policy
//!
//! # Components
//!
//! - `lane`: lane indices and lateral bands
//! - `tracked_vehicle`: typed sensor fusion entries
//! - `safety`: current/projected gap check for a candidate lane
//! - `planner`: lane change state machine and reference velocity ramp

pub mod lane;
pub mod tracked_vehicle;
pub mod safety;
pub mod planner;

pub use lane::Lane;
pub use tracked_vehicle::TrackedVehicle;
pub use safety::SafetyChecker;
pub use planner::{
    BehaviorDecision, BehaviorInput, BehaviorPlanner, LaneChangeTable, PlanningContext,
};
