//! Track map and road-relative coordinates
//!
//! - `track_map`: immutable waypoint table with nearest-waypoint and arc length queries
//! - `frenet`: conversion between global `(x, y)` and Frenet `(s, d)`

pub mod track_map;
pub mod frenet;

pub use track_map::{wrapped_s_offset, TrackMap, Waypoint};
pub use frenet::FrenetConverter;
