//! One planning cycle: localize, decide, generate
//!
//! `PlanningCycle` holds only immutable collaborators. All cross-cycle state
//! lives in the caller's [`PlanningContext`], which is updated only when the
//! cycle succeeds.

use std::sync::Arc;

use log::{debug, warn};

use crate::behavior::{
    BehaviorDecision, BehaviorInput, BehaviorPlanner, LaneChangeTable, PlanningContext,
    SafetyChecker, TrackedVehicle,
};
use crate::common::{FrenetPoint, Path2D, PlannerResult, Pose2D};
use crate::config::PlannerConfig;
use crate::map::{FrenetConverter, TrackMap};
use crate::trajectory::{TrajectoryGenerator, TrajectoryRequest};

/// Ego pose for the current cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoState {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub d: f64,
    /// [rad]
    pub heading: f64,
    /// [mph]
    pub speed: f64,
}

impl EgoState {
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.heading)
    }

    pub fn frenet(&self) -> FrenetPoint {
        FrenetPoint::new(self.s, self.d)
    }
}

/// Typed inbound record of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleInput {
    pub ego: EgoState,
    /// Unconsumed tail of the last emitted path
    pub previous_path: Path2D,
    /// Frenet position of the last point of `previous_path`, when known
    pub end_path: Option<FrenetPoint>,
    pub traffic: Vec<TrackedVehicle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutput {
    pub path: Path2D,
    pub decision: BehaviorDecision,
    /// Frenet point the new part of the path was planned from
    pub origin: FrenetPoint,
}

pub struct PlanningCycle {
    converter: FrenetConverter,
    behavior: BehaviorPlanner,
    trajectory: TrajectoryGenerator,
}

impl PlanningCycle {
    pub fn new(map: Arc<TrackMap>, config: &PlannerConfig) -> Self {
        let lane_width = config.track.lane_width;
        let safety = SafetyChecker::new(config.safety.clone(), lane_width, map.max_s());
        Self {
            converter: FrenetConverter::new(map, config.frenet.clone()),
            behavior: BehaviorPlanner::new(
                config.behavior.clone(),
                LaneChangeTable::default(),
                safety,
            ),
            trajectory: TrajectoryGenerator::new(config.trajectory.clone(), lane_width),
        }
    }

    pub fn with_defaults(map: Arc<TrackMap>) -> Self {
        Self::new(map, &PlannerConfig::default())
    }

    pub fn converter(&self) -> &FrenetConverter {
        &self.converter
    }

    pub fn path_length(&self) -> usize {
        self.trajectory.path_length()
    }

    /// Where the new part of the path starts, in Frenet coordinates.
    ///
    /// With leftover points this is the end of the previous path: taken from
    /// the input when supplied, otherwise localized from the last point. If
    /// localization hits degenerate geometry the previous cycle's origin is
    /// reused, and failing that the ego position.
    pub fn planning_origin(
        &self,
        ctx: &PlanningContext,
        ego: &EgoState,
        leftover: &Path2D,
        end_path: Option<FrenetPoint>,
    ) -> FrenetPoint {
        let last = match leftover.last() {
            None => return ego.frenet(),
            Some(last) => *last,
        };
        if let Some(end) = end_path {
            return end;
        }

        let heading = leftover
            .last_two()
            .map(|(before, last)| before.bearing_to(&last))
            .unwrap_or(ego.heading);
        match self.converter.to_frenet(last.x, last.y, heading) {
            Ok(frenet) => frenet,
            Err(e) => {
                let fallback = ctx.last_frenet.unwrap_or_else(|| ego.frenet());
                warn!("{}; planning from s={:.1} d={:.1}", e, fallback.s, fallback.d);
                fallback
            }
        }
    }

    pub fn run(&self, ctx: &mut PlanningContext, input: &CycleInput) -> PlannerResult<CycleOutput> {
        let mut leftover = input.previous_path.clone();
        leftover.truncate(self.path_length());

        let origin = self.planning_origin(ctx, &input.ego, &leftover, input.end_path);

        let ego = BehaviorInput {
            s: origin.s,
            speed: input.ego.speed,
            horizon_steps: leftover.len(),
        };

        let mut next_ctx = ctx.clone();
        let decision = self.behavior.plan(&mut next_ctx, &ego, &input.traffic);

        let request = TrajectoryRequest {
            ego: input.ego.pose(),
            origin_s: origin.s,
            lane: decision.target_lane,
            reference_velocity: decision.reference_velocity,
            previous_path: &leftover,
        };
        let path = self.trajectory.generate(&request, &self.converter)?;

        next_ctx.last_frenet = Some(origin);
        *ctx = next_ctx;

        debug!(
            "cycle: s={:.1} lane={} v_ref={:.2} leftover={} cars={}",
            origin.s,
            decision.target_lane,
            decision.reference_velocity,
            leftover.len(),
            input.traffic.len()
        );

        Ok(CycleOutput { path, decision, origin })
    }
}
