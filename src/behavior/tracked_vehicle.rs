//! Other vehicles reported by sensor fusion

use crate::common::{PlannerError, PlannerResult};

/// Instantaneous state of one other vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedVehicle {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub s: f64,
    pub d: f64,
}

impl TrackedVehicle {
    pub fn new(id: i64, x: f64, y: f64, vx: f64, vy: f64, s: f64, d: f64) -> Self {
        Self { id, x, y, vx, vy, s, d }
    }

    /// Vehicle at `(s, d)` moving at `speed` with the velocity along x
    pub fn at_frenet(id: i64, s: f64, d: f64, speed: f64) -> Self {
        Self::new(id, 0.0, 0.0, speed, 0.0, s, d)
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Longitudinal position after `time` seconds at constant speed
    pub fn projected_s(&self, time: f64) -> f64 {
        self.s + time * self.speed()
    }

    /// Build from a positional `[id, x, y, vx, vy, s, d]` record
    pub fn from_record(record: &[f64]) -> PlannerResult<Self> {
        match record {
            [id, x, y, vx, vy, s, d, ..] => Ok(Self::new(*id as i64, *x, *y, *vx, *vy, *s, *d)),
            _ => Err(PlannerError::ProtocolError(format!(
                "sensor fusion record needs 7 values, got {}",
                record.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_and_projection() {
        let v = TrackedVehicle::new(3, 0.0, 0.0, 3.0, 4.0, 100.0, 6.0);
        assert!((v.speed() - 5.0).abs() < 1e-12);
        assert!((v.projected_s(2.0) - 110.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_record() {
        let v = TrackedVehicle::from_record(&[7.0, 900.0, 1100.0, 20.0, 1.0, 250.0, 9.8]).unwrap();
        assert_eq!(v.id, 7);
        assert!((v.s - 250.0).abs() < 1e-12);
        assert!((v.d - 9.8).abs() < 1e-12);

        assert!(TrackedVehicle::from_record(&[1.0, 2.0, 3.0]).is_err());
    }
}
