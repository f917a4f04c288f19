//! Planner configuration
//!
//! Every tuning constant of the planner lives here. Each section has a
//! `Default` holding the values the planner was tuned with, and deserializes
//! with `#[serde(default)]` so a JSON file only needs the values it overrides.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::{PlannerError, PlannerResult};

/// Track constants handed to the map
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Track length; `s` wraps back to 0 here
    pub max_s: f64,
    /// Lane width [m]
    pub lane_width: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            max_s: 6945.554,
            lane_width: 4.0,
        }
    }
}

/// Frenet conversion parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrenetConfig {
    /// A waypoint whose bearing differs from the heading by more than this is behind us [rad]
    pub behind_threshold: f64,
    /// Fixed point used to decide the sign of `d`; must lie far off the track
    pub sign_reference: (f64, f64),
    /// Squared segment lengths below this are degenerate
    pub min_segment_sq: f64,
}

impl Default for FrenetConfig {
    fn default() -> Self {
        Self {
            behind_threshold: std::f64::consts::FRAC_PI_2,
            sign_reference: (1000.0, 2000.0),
            min_segment_sq: 1e-9,
        }
    }
}

/// Lane safety parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Minimum longitudinal gap to a car in the target lane, now and at the horizon [m]
    pub min_gap: f64,
    /// Duration of one path step [s]
    pub step_duration: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_gap: 25.0,
            step_duration: 0.02,
        }
    }
}

/// Behavior (lane selection and speed) parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Projected gap to a car ahead below which it counts as close [m]
    pub lead_gap: f64,
    /// Reference velocity change per cycle [mph]
    pub velocity_step: f64,
    /// Reference velocity ceiling [mph]
    pub speed_limit: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            lead_gap: 40.0,
            velocity_step: 0.224,
            speed_limit: 49.5,
        }
    }
}

/// Trajectory generation parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Number of points in every emitted path
    pub path_length: usize,
    /// Spacing of the far anchors along `s` [m]
    pub anchor_spacing: f64,
    /// Number of far anchors
    pub anchor_count: usize,
    /// Local x distance over which the step size is computed [m]
    pub lookahead: f64,
    /// Duration of one path step [s]
    pub step_duration: f64,
    /// Reference velocity units per m/s (mph -> m/s)
    pub velocity_scale: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            path_length: 50,
            anchor_spacing: 30.0,
            anchor_count: 3,
            lookahead: 30.0,
            step_duration: 0.02,
            velocity_scale: 2.24,
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub track: TrackConfig,
    pub frenet: FrenetConfig,
    pub safety: SafetyConfig,
    pub behavior: BehaviorConfig,
    pub trajectory: TrajectoryConfig,
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json_str(json: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        fn positive(name: &str, value: f64) -> PlannerResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PlannerError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        }

        positive("track.max_s", self.track.max_s)?;
        positive("track.lane_width", self.track.lane_width)?;
        positive("safety.step_duration", self.safety.step_duration)?;
        positive("trajectory.anchor_spacing", self.trajectory.anchor_spacing)?;
        positive("trajectory.lookahead", self.trajectory.lookahead)?;
        positive("trajectory.step_duration", self.trajectory.step_duration)?;
        positive("trajectory.velocity_scale", self.trajectory.velocity_scale)?;
        if self.trajectory.path_length == 0 {
            return Err(PlannerError::InvalidParameter(
                "trajectory.path_length must be at least 1".to_string(),
            ));
        }
        if self.trajectory.anchor_count == 0 {
            return Err(PlannerError::InvalidParameter(
                "trajectory.anchor_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trajectory.path_length, 50);
        assert!((config.safety.min_gap - 25.0).abs() < 1e-12);
        assert!((config.behavior.velocity_step - 0.224).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let config = PlannerConfig::from_json_str(
            r#"{ "behavior": { "speed_limit": 30.0 }, "track": { "max_s": 1000.0 } }"#,
        )
        .unwrap();
        assert!((config.behavior.speed_limit - 30.0).abs() < 1e-12);
        assert!((config.behavior.lead_gap - 40.0).abs() < 1e-12);
        assert!((config.track.max_s - 1000.0).abs() < 1e-12);
        assert!((config.track.lane_width - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PlannerConfig::from_json_str(r#"{ "trajectory": { "lookahead": 0.0 } }"#);
        assert!(matches!(err, Err(PlannerError::InvalidParameter(_))));

        let err = PlannerConfig::from_json_str(r#"{ "trajectory": { "path_length": 0 } }"#);
        assert!(matches!(err, Err(PlannerError::InvalidParameter(_))));
    }
}
