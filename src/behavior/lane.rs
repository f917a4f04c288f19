//! Lane indices and lateral geometry
//!
//! Three lanes of equal width on one carriageway, lane 0 on the left.
//! Lane `L` spans `d` in `(L * w, (L + 1) * w)` with its center at `(L + 0.5) * w`.

use std::fmt;

/// One of the three lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Left,
    Middle,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Middle, Lane::Right];

    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Middle => 1,
            Lane::Right => 2,
        }
    }

    /// Lane whose band contains `d`, if any
    pub fn from_d(d: f64, lane_width: f64) -> Option<Lane> {
        Lane::ALL.into_iter().find(|lane| lane.contains(d, lane_width))
    }

    pub fn center_d(self, lane_width: f64) -> f64 {
        lane_width * (self.index() as f64 + 0.5)
    }

    /// Open interval test; cars exactly on a lane line belong to neither lane
    pub fn contains(self, d: f64, lane_width: f64) -> bool {
        let left = lane_width * self.index() as f64;
        d > left && d < left + lane_width
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
