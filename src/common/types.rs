//! Common types used throughout highway_planner

use nalgebra::{Rotation2, Vector2};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Bearing from this point towards `other` [rad]
    pub fn bearing_to(&self, other: &Point2D) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Express a global point in this pose's frame (yaw mapped to zero)
    pub fn to_local(&self, p: &Point2D) -> Point2D {
        let shifted = p.to_vector() - self.position().to_vector();
        Point2D::from(Rotation2::new(-self.yaw) * shifted)
    }

    /// Inverse of [`Pose2D::to_local`]
    pub fn to_global(&self, p: &Point2D) -> Point2D {
        let rotated = Rotation2::new(self.yaw) * p.to_vector();
        Point2D::from(rotated + self.position().to_vector())
    }
}

/// Road-relative coordinates: arc length along the centerline and signed lateral offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenetPoint {
    pub s: f64,
    pub d: f64,
}

impl FrenetPoint {
    pub fn new(s: f64, d: f64) -> Self {
        Self { s, d }
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Zip separate coordinate lists; the longer list is cut to the shorter one
    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    /// Last two points as `(second_last, last)`
    pub fn last_two(&self) -> Option<(Point2D, Point2D)> {
        match self.points.as_slice() {
            [.., a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose_local_global_inverse() {
        let pose = Pose2D::new(10.0, -3.0, 0.7);
        let p = Point2D::new(12.5, 4.0);
        let back = pose.to_global(&pose.to_local(&p));
        assert!(back.distance(&p) < 1e-10);
    }

    #[test]
    fn test_pose_to_local_rotates_heading_to_x_axis() {
        // Facing north: a point straight ahead ends up on the local x axis
        let pose = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let local = pose.to_local(&Point2D::new(1.0, 6.0));
        assert!((local.x - 5.0).abs() < 1e-10);
        assert!(local.y.abs() < 1e-10);
    }

    #[test]
    fn test_path2d_last_two() {
        assert!(Path2D::from_xy(&[1.0], &[1.0]).last_two().is_none());
        let path = Path2D::from_xy(&[0.0, 1.0, 2.0], &[0.0, 0.5, 1.0]);
        let (a, b) = path.last_two().unwrap();
        assert_eq!(a, Point2D::new(1.0, 0.5));
        assert_eq!(b, Point2D::new(2.0, 1.0));
    }
}
