//! Lane safety check against current and projected traffic positions

use log::debug;

use crate::config::{SafetyConfig, TrackConfig};
use crate::map::wrapped_s_offset;

use super::lane::Lane;
use super::tracked_vehicle::TrackedVehicle;

/// Decides whether a lane is free of traffic around the ego vehicle
#[derive(Debug, Clone)]
pub struct SafetyChecker {
    config: SafetyConfig,
    lane_width: f64,
    /// Loop length; gaps are measured the short way round
    track_length: f64,
}

impl SafetyChecker {
    pub fn new(config: SafetyConfig, lane_width: f64, track_length: f64) -> Self {
        Self { config, lane_width, track_length }
    }

    pub fn with_defaults() -> Self {
        let track = TrackConfig::default();
        Self::new(SafetyConfig::default(), track.lane_width, track.max_s)
    }

    pub fn lane_width(&self) -> f64 {
        self.lane_width
    }

    /// Signed `s` distance from `from` to `to`, wrapped at the start line
    pub fn s_gap(&self, from: f64, to: f64) -> f64 {
        wrapped_s_offset(from, to, self.track_length)
    }

    /// Time covered by `horizon_steps` path points [s]
    pub fn horizon_time(&self, horizon_steps: usize) -> f64 {
        horizon_steps as f64 * self.config.step_duration
    }

    /// A lane is clear when every car in it keeps at least `min_gap` to the
    /// ego vehicle both now and after `horizon_steps` steps, with both
    /// extrapolated at constant speed.
    pub fn is_lane_clear(
        &self,
        ego_s: f64,
        ego_speed: f64,
        lane: Lane,
        horizon_steps: usize,
        traffic: &[TrackedVehicle],
    ) -> bool {
        let horizon = self.horizon_time(horizon_steps);
        let ego_future_s = ego_s + horizon * ego_speed;

        traffic
            .iter()
            .filter(|v| lane.contains(v.d, self.lane_width))
            .all(|v| {
                let current_gap = self.s_gap(ego_s, v.s).abs();
                let future_gap = self.s_gap(ego_future_s, v.projected_s(horizon)).abs();
                let clear = current_gap >= self.config.min_gap && future_gap >= self.config.min_gap;
                if !clear {
                    debug!(
                        "lane {} blocked by car {}: gap {:.1} now, {:.1} projected",
                        lane, v.id, current_gap, future_gap
                    );
                }
                clear
            })
    }
}
