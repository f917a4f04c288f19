//! Per-connection planner session
//!
//! A session owns the [`PlanningContext`] of one ego vehicle. The planning
//! pipeline itself is immutable and can be shared by any number of sessions.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::behavior::PlanningContext;
use crate::planning_cycle::PlanningCycle;
use crate::protocol::{encode_control, parse_frame, Inbound, MANUAL_RESPONSE};

pub struct PlannerSession {
    cycle: Arc<PlanningCycle>,
    context: PlanningContext,
    cycles: u64,
}

impl PlannerSession {
    pub fn new(cycle: Arc<PlanningCycle>) -> Self {
        info!("planner session started");
        Self {
            cycle,
            context: PlanningContext::default(),
            cycles: 0,
        }
    }

    pub fn context(&self) -> &PlanningContext {
        &self.context
    }

    /// Number of completed planning cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Reply to one inbound frame, if it needs a reply
    pub fn handle_frame(&mut self, frame: &str) -> Option<String> {
        let input = match parse_frame(frame) {
            Ok(Inbound::Telemetry(input)) => input,
            Ok(Inbound::NotAnEvent) => return None,
            Ok(Inbound::NoData) => return Some(MANUAL_RESPONSE.to_string()),
            Ok(Inbound::Other(event)) => {
                debug!("ignoring event {:?}", event);
                return None;
            }
            Err(e) => {
                warn!("rejected frame: {}", e);
                return Some(MANUAL_RESPONSE.to_string());
            }
        };

        let reply = self
            .cycle
            .run(&mut self.context, &input)
            .and_then(|output| encode_control(&output.path));
        match reply {
            Ok(reply) => {
                self.cycles += 1;
                Some(reply)
            }
            Err(e) => {
                warn!("planning failed: {}", e);
                Some(MANUAL_RESPONSE.to_string())
            }
        }
    }
}

impl Drop for PlannerSession {
    fn drop(&mut self) {
        info!("planner session closed after {} cycles", self.cycles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Lane;
    use crate::map::{TrackMap, Waypoint};

    const FREE_ROAD: &str = r#"42["telemetry",{"x":100,"y":-6,"yaw":0,"speed":0,"s":100,"d":6,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[]}]"#;
    const SLOW_LEAD: &str = r#"42["telemetry",{"x":100,"y":-6,"yaw":0,"speed":20,"s":100,"d":6,"previous_path_x":[],"previous_path_y":[],"end_path_s":0,"end_path_d":0,"sensor_fusion":[[4,120,-6,5,0,120,6]]}]"#;

    fn shared_cycle() -> Arc<PlanningCycle> {
        let waypoints = (0..100)
            .map(|i| Waypoint::new(i as f64 * 30.0, 0.0, i as f64 * 30.0, 0.0, -1.0))
            .collect();
        Arc::new(PlanningCycle::with_defaults(Arc::new(TrackMap::new(waypoints, 3000.0).unwrap())))
    }

    fn control_len(reply: &str) -> usize {
        let body = reply.strip_prefix("42").unwrap();
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value[0], "control");
        let xs = value[1]["next_x"].as_array().unwrap().len();
        let ys = value[1]["next_y"].as_array().unwrap().len();
        assert_eq!(xs, ys);
        xs
    }

    #[test]
    fn test_telemetry_gets_control_reply() {
        let mut session = PlannerSession::new(shared_cycle());
        let reply = session.handle_frame(FREE_ROAD).unwrap();
        assert_eq!(control_len(&reply), 50);
        assert_eq!(session.cycles(), 1);
        assert!((session.context().reference_velocity - 0.224).abs() < 1e-12);
    }

    #[test]
    fn test_no_data_gets_manual() {
        let mut session = PlannerSession::new(shared_cycle());
        assert_eq!(session.handle_frame("42null").as_deref(), Some(MANUAL_RESPONSE));
        assert_eq!(session.context(), &PlanningContext::default());
    }

    #[test]
    fn test_malformed_telemetry_leaves_context_alone() {
        let mut session = PlannerSession::new(shared_cycle());
        session.handle_frame(FREE_ROAD).unwrap();
        let before = session.context().clone();
        let reply = session.handle_frame(r#"42["telemetry",{"x":"oops"}]"#);
        assert_eq!(reply.as_deref(), Some(MANUAL_RESPONSE));
        assert_eq!(session.context(), &before);
        assert_eq!(session.cycles(), 1);
    }

    #[test]
    fn test_non_event_frames_get_no_reply() {
        let mut session = PlannerSession::new(shared_cycle());
        assert!(session.handle_frame("2").is_none());
        assert!(session.handle_frame(r#"42["manual",{}]"#).is_none());
    }

    #[test]
    fn test_sessions_do_not_share_context() {
        let cycle = shared_cycle();
        let mut first = PlannerSession::new(cycle.clone());
        let mut second = PlannerSession::new(cycle);
        first.handle_frame(SLOW_LEAD).unwrap();
        assert_eq!(first.context().current_lane, Lane::Left);
        assert_eq!(second.context().current_lane, Lane::Middle);
        second.handle_frame(FREE_ROAD).unwrap();
        assert_eq!(second.context().current_lane, Lane::Middle);
    }
}
