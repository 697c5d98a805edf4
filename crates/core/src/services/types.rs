//! Wire types and errors for the robot collaborator services.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::JointTrajectory;

/// Error code the planning and execution services report on success.
pub const MOTION_SUCCESS: i32 = 1;

/// Error code reported by the execution service when motion was stopped.
pub const MOTION_PREEMPTED: i32 = -7;

/// Errors that can occur when talking to a collaborator service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    /// The service answered with a non-success motion code.
    #[error("Service reported failure code {0}")]
    Rejected(i32),

    /// The service answered but refused the request.
    #[error("Request refused: {0}")]
    Refused(String),
}

impl ServiceError {
    /// Builds the error for a non-success motion code.
    pub fn from_code(code: i32) -> Option<Self> {
        (code != MOTION_SUCCESS).then_some(Self::Rejected(code))
    }

    /// Whether the failure came from a stop request rather than a fault.
    pub fn is_preempted(&self) -> bool {
        matches!(self, Self::Rejected(MOTION_PREEMPTED))
    }
}

/// How strictly a controller switch must be honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStrictness {
    #[default]
    BestEffort,
    Strict,
}

/// Request to the controller switching service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwitchControllerRequest {
    #[serde(default)]
    pub start_controllers: Vec<String>,
    #[serde(default)]
    pub stop_controllers: Vec<String>,
    #[serde(default)]
    pub strictness: SwitchStrictness,
}

impl SwitchControllerRequest {
    pub fn start(controller: &str) -> Self {
        Self {
            start_controllers: vec![controller.to_string()],
            ..Default::default()
        }
    }

    pub fn stop(controller: &str) -> Self {
        Self {
            stop_controllers: vec![controller.to_string()],
            ..Default::default()
        }
    }
}

/// Response from the planning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub error_code: i32,
    #[serde(default)]
    pub trajectory: Option<JointTrajectory>,
}

/// Response carrying only a motion code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionCodeResponse {
    pub error_code: i32,
}

/// Request to move a group to one of its named targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedMoveRequest {
    pub group: String,
    pub target: String,
    /// Whether the call returns only once motion has finished.
    pub wait: bool,
}

/// Request to halt a group's ongoing motion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    pub group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchControllerResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GripperRequest {
    pub enable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GripperResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert!(ServiceError::from_code(MOTION_SUCCESS).is_none());
        let err = ServiceError::from_code(-1).unwrap();
        assert!(matches!(err, ServiceError::Rejected(-1)));
        assert!(!err.is_preempted());
        assert!(ServiceError::from_code(MOTION_PREEMPTED).unwrap().is_preempted());
    }

    #[test]
    fn test_switch_request_defaults_to_best_effort() {
        let request: SwitchControllerRequest =
            serde_json::from_str(r#"{"start_controllers": ["robot_controller"]}"#).unwrap();
        assert_eq!(request.strictness, SwitchStrictness::BestEffort);
        assert!(request.stop_controllers.is_empty());
        assert_eq!(request, SwitchControllerRequest::start("robot_controller"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ServiceError::Rejected(-2).to_string(),
            "Service reported failure code -2"
        );
        assert_eq!(ServiceError::Timeout.to_string(), "Request timeout");
    }
}
