//! Spline based path generation toward the target lane
//!
//! The unconsumed tail of the last path is kept as is. New points continue
//! from its end along a spline through a few anchors: the last two leftover
//! points (or the car itself) and points far ahead on the target lane center.
//! The fit happens in the frame of the reference pose so the curve is a
//! function of local x.

use log::debug;

use crate::behavior::Lane;
use crate::common::{Path2D, PlannerResult, Point2D, Pose2D};
use crate::config::TrajectoryConfig;
use crate::map::FrenetConverter;

use super::cubic_spline::CubicSpline;

/// Shortest point spacing that still defines a heading [m]
const MIN_HEADING_BASE: f64 = 1e-6;

/// Everything needed to extend the path for one cycle
#[derive(Debug, Clone)]
pub struct TrajectoryRequest<'a> {
    /// Current pose of the car, heading in radians
    pub ego: Pose2D,
    /// Longitudinal origin for the far anchors
    pub origin_s: f64,
    pub lane: Lane,
    /// [mph]
    pub reference_velocity: f64,
    pub previous_path: &'a Path2D,
}

pub struct TrajectoryGenerator {
    config: TrajectoryConfig,
    lane_width: f64,
}

impl TrajectoryGenerator {
    pub fn new(config: TrajectoryConfig, lane_width: f64) -> Self {
        Self { config, lane_width }
    }

    pub fn with_defaults() -> Self {
        Self::new(TrajectoryConfig::default(), 4.0)
    }

    pub fn path_length(&self) -> usize {
        self.config.path_length
    }

    /// Pose the new points continue from, plus the anchors behind it.
    ///
    /// The heading comes from the last point of the leftover and the latest
    /// earlier point distinct from it. A leftover stacked on one spot (the car
    /// was holding position) has no heading of its own, so the ego heading is
    /// used at its end.
    pub fn reference_pose(&self, ego: &Pose2D, previous_path: &Path2D) -> (Pose2D, Vec<Point2D>) {
        let (last, rest) = match previous_path.points.split_last() {
            Some((last, rest)) if !rest.is_empty() => (*last, rest),
            _ => return (*ego, vec![ego.position()]),
        };
        match rest.iter().rev().find(|p| p.distance(&last) > MIN_HEADING_BASE) {
            Some(&before) => {
                let yaw = before.bearing_to(&last);
                (Pose2D::new(last.x, last.y, yaw), vec![before, last])
            }
            None => (Pose2D::new(last.x, last.y, ego.yaw), vec![last]),
        }
    }

    /// Distance covered by one path step at `reference_velocity` [m]
    pub fn step_distance(&self, reference_velocity: f64) -> f64 {
        (reference_velocity / self.config.velocity_scale * self.config.step_duration).max(0.0)
    }

    pub fn generate(
        &self,
        request: &TrajectoryRequest,
        converter: &FrenetConverter,
    ) -> PlannerResult<Path2D> {
        let target_len = self.config.path_length;
        let leftover = &request.previous_path.points[..request.previous_path.len().min(target_len)];
        let leftover = Path2D::from_points(leftover.to_vec());

        let (reference, mut anchors) = self.reference_pose(&request.ego, &leftover);

        let d = request.lane.center_d(self.lane_width);
        for k in 1..=self.config.anchor_count {
            let s = request.origin_s + self.config.anchor_spacing * k as f64;
            anchors.push(converter.to_cartesian(s, d));
        }

        // Local frame; anchors that do not move forward in x would break the fit
        let mut xs: Vec<f64> = Vec::with_capacity(anchors.len());
        let mut ys: Vec<f64> = Vec::with_capacity(anchors.len());
        for anchor in &anchors {
            let local = reference.to_local(anchor);
            if xs.last().map_or(true, |&last| local.x > last) {
                xs.push(local.x);
                ys.push(local.y);
            } else {
                debug!("dropping anchor at local x {:.2}", local.x);
            }
        }
        let spline = CubicSpline::new(&xs, &ys)?;

        // Step along local x so that the chord to the lookahead point is
        // covered at the reference velocity
        let target_x = self.config.lookahead;
        let target_y = spline.calc(target_x);
        let target_dist = target_x.hypot(target_y);
        let step = self.step_distance(request.reference_velocity);
        let x_step = if step > 0.0 {
            let n = target_dist / step;
            target_x / n
        } else {
            0.0
        };

        let mut path = Path2D::with_capacity(target_len);
        for p in &leftover.points {
            path.push(*p);
        }

        let mut x_add_on = 0.0;
        for _ in leftover.len()..target_len {
            let x_point = x_add_on + x_step;
            let y_point = spline.calc(x_point);
            x_add_on = x_point;
            path.push(reference.to_global(&Point2D::new(x_point, y_point)));
        }

        Ok(path)
    }
}
