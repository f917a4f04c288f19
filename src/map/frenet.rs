//! Cartesian <-> Frenet conversion over a waypoint table
//!
//! `to_cartesian` treats the track as a polyline, so headings jump at every
//! waypoint and the two directions are only approximately inverse. The sign
//! of `d` comes from comparing distances to a fixed reference point
//! ([`FrenetConfig::sign_reference`]). That works for tracks that stay well
//! clear of the point and is not a geometric convention.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use crate::common::{FrenetPoint, PlannerError, PlannerResult, Point2D};
use crate::config::FrenetConfig;

use super::track_map::TrackMap;

/// Bidirectional global/road-relative transform
#[derive(Debug, Clone)]
pub struct FrenetConverter {
    map: Arc<TrackMap>,
    config: FrenetConfig,
}

impl FrenetConverter {
    pub fn new(map: Arc<TrackMap>, config: FrenetConfig) -> Self {
        Self { map, config }
    }

    pub fn with_defaults(map: Arc<TrackMap>) -> Self {
        Self::new(map, FrenetConfig::default())
    }

    pub fn map(&self) -> &TrackMap {
        &self.map
    }

    pub fn closest_waypoint(&self, x: f64, y: f64) -> usize {
        self.map.closest_waypoint(x, y)
    }

    /// First waypoint ahead of a vehicle at `(x, y)` facing `heading` [rad]
    pub fn next_waypoint(&self, x: f64, y: f64, heading: f64) -> usize {
        let closest = self.closest_waypoint(x, y);
        let bearing = Point2D::new(x, y).bearing_to(&self.map.waypoint(closest).position());

        let mut angle = (heading - bearing).rem_euclid(2.0 * PI);
        angle = angle.min(2.0 * PI - angle);

        if angle > self.config.behind_threshold {
            self.map.next_index(closest)
        } else {
            closest
        }
    }

    pub fn to_frenet(&self, x: f64, y: f64, heading: f64) -> PlannerResult<FrenetPoint> {
        let next_wp = self.next_waypoint(x, y, heading);
        let prev_wp = self.map.prev_index(next_wp);
        let prev = self.map.waypoint(prev_wp).position();
        let next = self.map.waypoint(next_wp).position();

        let n = next.to_vector() - prev.to_vector();
        let v = Point2D::new(x, y).to_vector() - prev.to_vector();

        let n_sq = n.norm_squared();
        if n_sq < self.config.min_segment_sq {
            return Err(PlannerError::DegenerateGeometry(format!(
                "segment {} -> {} has zero length",
                prev_wp, next_wp
            )));
        }

        let proj = n * (v.dot(&n) / n_sq);
        let mut d = (v - proj).norm();

        // Relative to the segment start, like the vehicle and projection vectors
        let (rx, ry) = self.config.sign_reference;
        let center = Point2D::new(rx - prev.x, ry - prev.y);
        let center_to_pos = center.distance(&Point2D::from(v));
        let center_to_ref = center.distance(&Point2D::from(proj));
        if center_to_pos <= center_to_ref {
            d = -d;
        }

        let s = self.map.arc_length(prev_wp) + proj.norm();
        Ok(FrenetPoint::new(s, d))
    }

    pub fn to_cartesian(&self, s: f64, d: f64) -> Point2D {
        let s = self.map.normalize_s(s);
        let prev_wp = self.map.segment_index(s);
        let next_wp = self.map.next_index(prev_wp);
        let prev = self.map.waypoint(prev_wp);
        let next = self.map.waypoint(next_wp);

        let heading = prev.position().bearing_to(&next.position());
        let mut seg_s = s - prev.s;
        if seg_s < 0.0 {
            // Query lies before the first waypoint: on the closing segment
            seg_s += self.map.max_s();
        }

        let seg_x = prev.x + seg_s * heading.cos();
        let seg_y = prev.y + seg_s * heading.sin();

        let perp_heading = heading - FRAC_PI_2;
        Point2D::new(seg_x + d * perp_heading.cos(), seg_y + d * perp_heading.sin())
    }
}
