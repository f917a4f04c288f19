//! Lane selection and speed policy
//!
//! The planner is a three-state machine over [`Lane`]. A change is only
//! considered when a car ahead in the current lane gets close, and the
//! candidates come from a fixed [`LaneChangeTable`]. At most one change
//! happens per cycle.

use log::{debug, info};

use crate::common::FrenetPoint;
use crate::config::BehaviorConfig;

use super::lane::Lane;
use super::safety::SafetyChecker;
use super::tracked_vehicle::TrackedVehicle;

/// Cross-cycle planner state, owned by one session
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningContext {
    pub current_lane: Lane,
    /// Target speed, ramped by a fixed step each cycle [mph]
    pub reference_velocity: f64,
    /// Planning origin of the last cycle, kept for Frenet fallbacks
    pub last_frenet: Option<FrenetPoint>,
}

impl PlanningContext {
    pub fn new(current_lane: Lane, reference_velocity: f64) -> Self {
        Self {
            current_lane,
            reference_velocity,
            last_frenet: None,
        }
    }
}

impl Default for PlanningContext {
    fn default() -> Self {
        Self::new(Lane::Middle, 0.0)
    }
}

/// Ordered lane change candidates per lane, tried first to last
#[derive(Debug, Clone, PartialEq)]
pub struct LaneChangeTable {
    candidates: [Vec<Lane>; 3],
}

impl LaneChangeTable {
    pub fn new(left: Vec<Lane>, middle: Vec<Lane>, right: Vec<Lane>) -> Self {
        Self {
            candidates: [left, middle, right],
        }
    }

    pub fn candidates(&self, lane: Lane) -> &[Lane] {
        &self.candidates[lane.index()]
    }
}

impl Default for LaneChangeTable {
    /// Outer lanes move to the middle; the middle prefers the left lane
    fn default() -> Self {
        Self::new(
            vec![Lane::Middle],
            vec![Lane::Left, Lane::Right],
            vec![Lane::Middle],
        )
    }
}

/// What the planner decided this cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorDecision {
    pub lead_close: bool,
    pub lane_change_initiated: bool,
    pub target_lane: Lane,
    pub reference_velocity: f64,
}

/// Ego quantities the policy needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorInput {
    /// Longitudinal planning origin (end of the previous path if any)
    pub s: f64,
    pub speed: f64,
    /// Number of leftover path points; the projection horizon in steps
    pub horizon_steps: usize,
}

pub struct BehaviorPlanner {
    config: BehaviorConfig,
    table: LaneChangeTable,
    safety: SafetyChecker,
}

impl BehaviorPlanner {
    pub fn new(config: BehaviorConfig, table: LaneChangeTable, safety: SafetyChecker) -> Self {
        Self { config, table, safety }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            BehaviorConfig::default(),
            LaneChangeTable::default(),
            SafetyChecker::with_defaults(),
        )
    }

    /// True when some car ahead in `lane` will be within `lead_gap` of `ego.s`
    /// at the horizon. Distances wrap at the start line.
    pub fn lead_close(&self, ego: &BehaviorInput, lane: Lane, traffic: &[TrackedVehicle]) -> bool {
        let horizon = self.safety.horizon_time(ego.horizon_steps);
        traffic
            .iter()
            .filter(|v| lane.contains(v.d, self.safety.lane_width()))
            .any(|v| {
                let ahead = self.safety.s_gap(ego.s, v.s) > 0.0;
                let close = ahead && self.safety.s_gap(ego.s, v.projected_s(horizon)) < self.config.lead_gap;
                if close {
                    debug!("car {} ahead at s={:.1}, speed {:.1}", v.id, v.s, v.speed());
                }
                close
            })
    }

    /// First clear candidate lane from the table, if any
    pub fn select_lane(
        &self,
        ego: &BehaviorInput,
        lane: Lane,
        traffic: &[TrackedVehicle],
    ) -> Option<Lane> {
        self.table.candidates(lane).iter().copied().find(|&candidate| {
            self.safety
                .is_lane_clear(ego.s, ego.speed, candidate, ego.horizon_steps, traffic)
        })
    }

    /// Run the policy once and update `ctx` in place
    pub fn plan(
        &self,
        ctx: &mut PlanningContext,
        ego: &BehaviorInput,
        traffic: &[TrackedVehicle],
    ) -> BehaviorDecision {
        let lead_close = self.lead_close(ego, ctx.current_lane, traffic);

        let mut lane_change_initiated = false;
        if lead_close {
            if let Some(target) = self.select_lane(ego, ctx.current_lane, traffic) {
                info!("changing lane {} -> {}", ctx.current_lane, target);
                ctx.current_lane = target;
                lane_change_initiated = true;
            } else {
                debug!("no clear lane next to lane {}, staying", ctx.current_lane);
            }
        }

        if lead_close && !lane_change_initiated {
            ctx.reference_velocity = (ctx.reference_velocity - self.config.velocity_step).max(0.0);
        } else if ctx.reference_velocity < self.config.speed_limit {
            ctx.reference_velocity += self.config.velocity_step;
        }

        BehaviorDecision {
            lead_close,
            lane_change_initiated,
            target_lane: ctx.current_lane,
            reference_velocity: ctx.reference_velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ego(s: f64) -> BehaviorInput {
        BehaviorInput { s, speed: 20.0, horizon_steps: 0 }
    }

    #[test]
    fn test_default_table() {
        let table = LaneChangeTable::default();
        assert_eq!(table.candidates(Lane::Left), &[Lane::Middle]);
        assert_eq!(table.candidates(Lane::Middle), &[Lane::Left, Lane::Right]);
        assert_eq!(table.candidates(Lane::Right), &[Lane::Middle]);
    }

    #[test]
    fn test_free_road_accelerates_and_holds_lane() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::default();
        let decision = planner.plan(&mut ctx, &ego(100.0), &[]);
        assert!(!decision.lead_close);
        assert!(!decision.lane_change_initiated);
        assert_eq!(ctx.current_lane, Lane::Middle);
        assert!((ctx.reference_velocity - 0.224).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_stops_at_ceiling() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::new(Lane::Middle, 49.6);
        planner.plan(&mut ctx, &ego(100.0), &[]);
        assert!((ctx.reference_velocity - 49.6).abs() < 1e-12);
    }

    #[test]
    fn test_lead_close_detection() {
        let planner = BehaviorPlanner::with_defaults();
        let ahead = [TrackedVehicle::at_frenet(1, 120.0, 6.0, 5.0)];
        assert!(planner.lead_close(&ego(100.0), Lane::Middle, &ahead));
        // Not in this lane
        assert!(!planner.lead_close(&ego(100.0), Lane::Left, &ahead));
        // Behind us
        let behind = [TrackedVehicle::at_frenet(1, 90.0, 6.0, 5.0)];
        assert!(!planner.lead_close(&ego(100.0), Lane::Middle, &behind));
        // Far ahead
        let far = [TrackedVehicle::at_frenet(1, 150.0, 6.0, 5.0)];
        assert!(!planner.lead_close(&ego(100.0), Lane::Middle, &far));
        // Close now but pulling away over the horizon
        let fast = [TrackedVehicle::at_frenet(1, 120.0, 6.0, 30.0)];
        let with_horizon = BehaviorInput { s: 100.0, speed: 20.0, horizon_steps: 50 };
        assert!(!planner.lead_close(&with_horizon, Lane::Middle, &fast));
    }

    #[test]
    fn test_middle_lane_prefers_left() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::new(Lane::Middle, 30.0);
        let traffic = [TrackedVehicle::at_frenet(1, 120.0, 6.0, 5.0)];
        let decision = planner.plan(&mut ctx, &ego(100.0), &traffic);
        assert!(decision.lead_close);
        assert!(decision.lane_change_initiated);
        assert_eq!(ctx.current_lane, Lane::Left);
        // Velocity keeps ramping after a lane change
        assert!((ctx.reference_velocity - 30.224).abs() < 1e-12);
    }

    #[test]
    fn test_middle_lane_falls_back_to_right() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::new(Lane::Middle, 30.0);
        let traffic = [
            TrackedVehicle::at_frenet(1, 120.0, 6.0, 5.0),
            TrackedVehicle::at_frenet(2, 105.0, 2.0, 20.0),
        ];
        let decision = planner.plan(&mut ctx, &ego(100.0), &traffic);
        assert!(decision.lane_change_initiated);
        assert_eq!(ctx.current_lane, Lane::Right);
    }

    #[test]
    fn test_outer_lanes_go_to_middle() {
        let planner = BehaviorPlanner::with_defaults();
        for (lane, d) in [(Lane::Left, 2.0), (Lane::Right, 10.0)] {
            let mut ctx = PlanningContext::new(lane, 30.0);
            let traffic = [TrackedVehicle::at_frenet(1, 120.0, d, 5.0)];
            planner.plan(&mut ctx, &ego(100.0), &traffic);
            assert_eq!(ctx.current_lane, Lane::Middle);
        }
    }

    #[test]
    fn test_blocked_neighbours_slow_down() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::new(Lane::Middle, 30.0);
        let traffic = [
            TrackedVehicle::at_frenet(1, 120.0, 6.0, 5.0),
            TrackedVehicle::at_frenet(2, 110.0, 2.0, 20.0),
            TrackedVehicle::at_frenet(3, 95.0, 10.0, 20.0),
        ];
        let decision = planner.plan(&mut ctx, &ego(100.0), &traffic);
        assert!(decision.lead_close);
        assert!(!decision.lane_change_initiated);
        assert_eq!(ctx.current_lane, Lane::Middle);
        assert!((ctx.reference_velocity - (30.0 - 0.224)).abs() < 1e-12);
    }

    #[test]
    fn test_slow_down_clamps_at_zero() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::new(Lane::Left, 0.1);
        let traffic = [
            TrackedVehicle::at_frenet(1, 120.0, 2.0, 5.0),
            TrackedVehicle::at_frenet(2, 100.0, 6.0, 20.0),
        ];
        planner.plan(&mut ctx, &ego(100.0), &traffic);
        assert_eq!(ctx.current_lane, Lane::Left);
        assert_eq!(ctx.reference_velocity, 0.0);
    }

    #[test]
    fn test_at_most_one_change_per_cycle() {
        let planner = BehaviorPlanner::with_defaults();
        let mut ctx = PlanningContext::new(Lane::Right, 30.0);
        // Close cars ahead in both the right and middle lanes; the left lane is free
        let traffic = [
            TrackedVehicle::at_frenet(1, 120.0, 10.0, 5.0),
            TrackedVehicle::at_frenet(2, 130.0, 6.0, 5.0),
        ];
        let decision = planner.plan(&mut ctx, &ego(100.0), &traffic);
        assert!(decision.lane_change_initiated);
        assert_eq!(ctx.current_lane, Lane::Middle);
    }

    #[test]
    fn test_lead_across_start_line() {
        let planner = BehaviorPlanner::new(
            BehaviorConfig::default(),
            LaneChangeTable::default(),
            SafetyChecker::new(crate::config::SafetyConfig::default(), 4.0, 1000.0),
        );
        let just_past_line = [TrackedVehicle::at_frenet(1, 10.0, 6.0, 5.0)];
        assert!(planner.lead_close(&ego(995.0), Lane::Middle, &just_past_line));
        // Just behind the line is behind an ego that already crossed it
        let before_line = [TrackedVehicle::at_frenet(1, 995.0, 6.0, 5.0)];
        assert!(!planner.lead_close(&ego(10.0), Lane::Middle, &before_line));
    }
}
