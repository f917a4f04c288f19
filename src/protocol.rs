//! Simulator message codec
//!
//! Frames are socket.io text events: `42` followed by a JSON array of
//! `[event_name, data]`. Telemetry is turned into a typed [`CycleInput`]
//! here; nothing past this module sees raw JSON or positional arrays.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::behavior::TrackedVehicle;
use crate::common::{FrenetPoint, Path2D, PlannerError, PlannerResult};
use crate::planning_cycle::{CycleInput, EgoState};

/// Reply that hands control back to the simulator
pub const MANUAL_RESPONSE: &str = "42[\"manual\",{}]";

const EVENT_PREFIX: &str = "42";

/// Raw telemetry data object
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryMessage {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub d: f64,
    /// [deg]
    pub yaw: f64,
    pub speed: f64,
    pub previous_path_x: Vec<f64>,
    pub previous_path_y: Vec<f64>,
    pub end_path_s: f64,
    pub end_path_d: f64,
    pub sensor_fusion: Vec<Vec<f64>>,
}

impl TelemetryMessage {
    pub fn into_cycle_input(self) -> PlannerResult<CycleInput> {
        if self.previous_path_x.len() != self.previous_path_y.len() {
            return Err(PlannerError::ProtocolError(format!(
                "previous path has {} x but {} y values",
                self.previous_path_x.len(),
                self.previous_path_y.len()
            )));
        }
        let previous_path = Path2D::from_xy(&self.previous_path_x, &self.previous_path_y);
        let end_path = if previous_path.is_empty() {
            None
        } else {
            Some(FrenetPoint::new(self.end_path_s, self.end_path_d))
        };

        let traffic = self
            .sensor_fusion
            .iter()
            .map(|record| TrackedVehicle::from_record(record))
            .collect::<PlannerResult<Vec<_>>>()?;

        Ok(CycleInput {
            ego: EgoState {
                x: self.x,
                y: self.y,
                s: self.s,
                d: self.d,
                heading: self.yaw.to_radians(),
                speed: self.speed,
            },
            previous_path,
            end_path,
            traffic,
        })
    }
}

#[derive(Debug, Serialize)]
struct ControlMessage {
    next_x: Vec<f64>,
    next_y: Vec<f64>,
}

/// Decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Not a socket.io event (handshake, ping, ...)
    NotAnEvent,
    /// Event without data; answered with [`MANUAL_RESPONSE`]
    NoData,
    Telemetry(CycleInput),
    /// Any other event name
    Other(String),
}

pub fn parse_frame(frame: &str) -> PlannerResult<Inbound> {
    let payload = match frame.strip_prefix(EVENT_PREFIX) {
        Some(payload) => payload,
        None => return Ok(Inbound::NotAnEvent),
    };

    let value: Value = serde_json::from_str(payload.trim())?;
    let items = match value {
        Value::Null => return Ok(Inbound::NoData),
        Value::Array(items) => items,
        other => {
            return Err(PlannerError::ProtocolError(format!(
                "expected an event array, got {}",
                other
            )))
        }
    };

    let mut items = items.into_iter();
    let event = match items.next() {
        Some(Value::String(event)) => event,
        Some(other) => {
            return Err(PlannerError::ProtocolError(format!(
                "event name must be a string, got {}",
                other
            )))
        }
        None => return Ok(Inbound::NoData),
    };
    let data = match items.next() {
        None | Some(Value::Null) => return Ok(Inbound::NoData),
        Some(data) => data,
    };

    if event == "telemetry" {
        let message: TelemetryMessage = serde_json::from_value(data)?;
        Ok(Inbound::Telemetry(message.into_cycle_input()?))
    } else {
        Ok(Inbound::Other(event))
    }
}

pub fn encode_control(path: &Path2D) -> PlannerResult<String> {
    let message = ControlMessage {
        next_x: path.x_coords(),
        next_y: path.y_coords(),
    };
    Ok(format!("42[\"control\",{}]", serde_json::to_string(&message)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TELEMETRY: &str = r#"42["telemetry",{"x":909.48,"y":1128.67,"yaw":90,"speed":20,"s":124.83,"d":6.16,"previous_path_x":[909.5,909.9],"previous_path_y":[1128.7,1128.7],"end_path_s":125.6,"end_path_d":6.0,"sensor_fusion":[[0,1012.9,1124.9,20.1,0.2,230.1,10.0],[1,775.8,1425.3,0,0,6721.8,-277.7]]}]"#;

    #[test]
    fn test_parse_telemetry() {
        let input = match parse_frame(TELEMETRY).unwrap() {
            Inbound::Telemetry(input) => input,
            other => panic!("unexpected frame: {:?}", other),
        };
        assert!((input.ego.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(input.previous_path.len(), 2);
        assert_eq!(input.end_path, Some(FrenetPoint::new(125.6, 6.0)));
        assert_eq!(input.traffic.len(), 2);
        assert_eq!(input.traffic[1].id, 1);
        assert!((input.traffic[0].speed() - 20.1f64.hypot(0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_previous_path_has_no_end() {
        let frame = r#"42["telemetry",{"x":1,"y":2,"yaw":0,"speed":0,"s":3,"d":6,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[]}]"#;
        match parse_frame(frame).unwrap() {
            Inbound::Telemetry(input) => {
                assert!(input.end_path.is_none());
                assert!(input.traffic.is_empty());
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_no_data_frames() {
        assert_eq!(parse_frame("42null").unwrap(), Inbound::NoData);
        assert_eq!(parse_frame(r#"42["telemetry",null]"#).unwrap(), Inbound::NoData);
        assert_eq!(parse_frame(r#"42["telemetry"]"#).unwrap(), Inbound::NoData);
    }

    #[test]
    fn test_non_event_and_other_frames() {
        assert_eq!(parse_frame("2").unwrap(), Inbound::NotAnEvent);
        assert_eq!(parse_frame("40").unwrap(), Inbound::NotAnEvent);
        assert_eq!(
            parse_frame(r#"42["manual",{}]"#).unwrap(),
            Inbound::Other("manual".to_string())
        );
    }

    #[test]
    fn test_malformed_frames() {
        assert!(parse_frame("42[\"telemetry\",{").is_err());
        assert!(parse_frame(r#"42["telemetry",{"x":1}]"#).is_err());
        assert!(parse_frame(r#"42{"x":1}"#).is_err());
        let bad_fusion = r#"42["telemetry",{"x":1,"y":2,"yaw":0,"speed":0,"s":3,"d":6,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[[1,2,3]]}]"#;
        assert!(matches!(parse_frame(bad_fusion), Err(PlannerError::ProtocolError(_))));
        let bad_path = r#"42["telemetry",{"x":1,"y":2,"yaw":0,"speed":0,"s":3,"d":6,"previous_path_x":[1,2],"previous_path_y":[1],"end_path_s":0,"end_path_d":0,"sensor_fusion":[]}]"#;
        assert!(matches!(parse_frame(bad_path), Err(PlannerError::ProtocolError(_))));
    }

    #[test]
    fn test_encode_control() {
        let path = Path2D::from_xy(&[1.0, 2.5], &[3.0, 4.0]);
        let frame = encode_control(&path).unwrap();
        assert_eq!(frame, r#"42["control",{"next_x":[1.0,2.5],"next_y":[3.0,4.0]}]"#);
    }
}
