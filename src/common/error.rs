//! Error types for highway_planner

use thiserror::Error;

/// Main error type for the planner
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Waypoint table is unusable
    #[error("Invalid map: {0}")]
    InvalidMap(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Geometry too degenerate to compute with (zero-length segment, etc.)
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// Trajectory could not be built
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Inbound frame could not be understood
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::InvalidMap("need at least 2 waypoints".to_string());
        assert_eq!(format!("{}", err), "Invalid map: need at least 2 waypoints");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::IoError(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<f64>("not a number").unwrap_err();
        let err: PlannerError = json_err.into();
        assert!(matches!(err, PlannerError::JsonError(_)));
    }
}
