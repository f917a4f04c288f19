//! Waypoint table of the track centerline
//!
//! The table is loaded once and never mutated afterwards; cycles share it
//! through an `Arc`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use itertools::Itertools;
use log::info;
use ordered_float::OrderedFloat;

use crate::common::{PlannerError, PlannerResult, Point2D};

/// Sampled centerline point with its lateral unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, s: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, s, dx, dy }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.s, self.dx, self.dy].iter().all(|v| v.is_finite())
    }
}

/// Signed distance along a loop of length `max_s` from `from` to `to`, taking
/// the shorter way round. The result lies in `(-max_s / 2, max_s / 2]`.
pub fn wrapped_s_offset(from: f64, to: f64, max_s: f64) -> f64 {
    let ahead = (to - from).rem_euclid(max_s);
    if ahead > max_s / 2.0 {
        ahead - max_s
    } else {
        ahead
    }
}

/// Circular, immutable waypoint table
#[derive(Debug, Clone)]
pub struct TrackMap {
    waypoints: Vec<Waypoint>,
    max_s: f64,
    /// Euclidean length of all segments strictly before each waypoint
    arc_lengths: Vec<f64>,
}

impl TrackMap {
    pub fn new(waypoints: Vec<Waypoint>, max_s: f64) -> PlannerResult<Self> {
        if waypoints.len() < 2 {
            return Err(PlannerError::InvalidMap(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        if !(max_s.is_finite() && max_s > 0.0) {
            return Err(PlannerError::InvalidMap(format!(
                "max_s must be positive, got {}",
                max_s
            )));
        }

        if let Some(i) = waypoints.iter().position(|wp| !wp.is_finite()) {
            return Err(PlannerError::InvalidMap(format!(
                "waypoint {} has a non-finite value",
                i
            )));
        }
        if let Some((i, (a, b))) = waypoints
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| b.s < a.s)
        {
            return Err(PlannerError::InvalidMap(format!(
                "s decreases from {} to {} at waypoint {}",
                a.s,
                b.s,
                i + 1
            )));
        }

        let mut arc_lengths = Vec::with_capacity(waypoints.len());
        arc_lengths.push(0.0);
        for (a, b) in waypoints.iter().tuple_windows() {
            let prev = arc_lengths[arc_lengths.len() - 1];
            arc_lengths.push(prev + a.position().distance(&b.position()));
        }

        Ok(Self { waypoints, max_s, arc_lengths })
    }

    /// Parse whitespace separated `x y s dx dy` rows
    pub fn from_reader<R: BufRead>(reader: R, max_s: f64) -> PlannerResult<Self> {
        let mut waypoints = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let values = line
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| {
                    PlannerError::InvalidMap(format!("line {}: {}", lineno + 1, e))
                })?;
            match values.as_slice() {
                [x, y, s, dx, dy, ..] => waypoints.push(Waypoint::new(*x, *y, *s, *dx, *dy)),
                _ => {
                    return Err(PlannerError::InvalidMap(format!(
                        "line {}: expected 5 columns, got {}",
                        lineno + 1,
                        values.len()
                    )))
                }
            }
        }
        Self::new(waypoints, max_s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, max_s: f64) -> PlannerResult<Self> {
        let file = File::open(path.as_ref())?;
        let map = Self::from_reader(BufReader::new(file), max_s)?;
        info!(
            "loaded {} waypoints from {}",
            map.len(),
            path.as_ref().display()
        );
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn max_s(&self) -> f64 {
        self.max_s
    }

    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.waypoints[index]
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Index following `index`, wrapping past the end
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }

    /// Index preceding `index`, wrapping before the start
    pub fn prev_index(&self, index: usize) -> usize {
        if index == 0 {
            self.waypoints.len() - 1
        } else {
            index - 1
        }
    }

    /// Summed segment length of all waypoints before `index`
    pub fn arc_length(&self, index: usize) -> f64 {
        self.arc_lengths[index]
    }

    /// Wrap `s` into `[0, max_s)`
    pub fn normalize_s(&self, s: f64) -> f64 {
        s.rem_euclid(self.max_s)
    }

    /// Nearest waypoint by Euclidean distance; ties go to the lowest index
    pub fn closest_waypoint(&self, x: f64, y: f64) -> usize {
        let query = Point2D::new(x, y);
        self.waypoints
            .iter()
            .enumerate()
            .min_by_key(|(_, wp)| OrderedFloat(wp.position().distance(&query)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Start index of the segment holding `s`, i.e. the waypoint with the
    /// largest `s` not exceeding it. Wraps to the last waypoint when `s` lies
    /// before the first one.
    pub fn segment_index(&self, s: f64) -> usize {
        let count = self.waypoints.partition_point(|wp| wp.s <= s);
        if count == 0 {
            self.waypoints.len() - 1
        } else {
            count - 1
        }
    }
}
