//! Types for motion planning and execution requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::ActuationGroupInfo;
use crate::geometry::StampedPose;

/// Time assigned to the first waypoint of every planned trajectory.
///
/// Some trajectory controllers reject a trajectory whose first point is
/// stamped at zero.
pub const FIRST_WAYPOINT_TIME_SECS: f64 = 0.01;

/// Errors raised while building motion requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    /// The group identity is not registered with the request builder.
    #[error("unknown actuation group: {0}")]
    UnknownGroup(String),
}

/// Named stage of the pick-and-place pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Approach,
    Pick,
    Retreat,
    Place,
    Return,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Approach => "approach",
            SegmentKind::Pick => "pick",
            SegmentKind::Retreat => "retreat",
            SegmentKind::Place => "place",
            SegmentKind::Return => "return",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint configuration of one group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointState {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
}

/// One time-stamped waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub positions: Vec<f64>,
    /// Offset from trajectory start (seconds).
    pub time_from_start: f64,
}

/// Ordered, time-stamped sequence of joint waypoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointTrajectory {
    pub joint_names: Vec<String>,
    pub points: Vec<TrajectoryPoint>,
}

impl JointTrajectory {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Planned duration: the last waypoint's offset from start.
    pub fn duration(&self) -> Duration {
        self.points
            .last()
            .map(|p| Duration::from_secs_f64(p.time_from_start.max(0.0)))
            .unwrap_or_default()
    }

    /// Re-stamps the first waypoint at [`FIRST_WAYPOINT_TIME_SECS`].
    pub fn curate(&mut self) {
        if let Some(first) = self.points.first_mut() {
            first.time_from_start = FIRST_WAYPOINT_TIME_SECS;
        }
    }

    /// Joint state at the first waypoint.
    pub fn start_state(&self) -> Option<JointState> {
        self.points.first().map(|p| JointState {
            names: self.joint_names.clone(),
            positions: p.positions.clone(),
        })
    }
}

/// Goal constraints for one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConstraints {
    /// Link the target pose applies to.
    pub link_name: String,
    pub target: StampedPose,
    /// Absolute tolerance per axis (x, y, z) in meters.
    pub position_tolerance: [f64; 3],
    /// Absolute tolerance about (x, y, z) in radians.
    pub orientation_tolerance: [f64; 3],
}

/// Request to the external planning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPlanRequest {
    pub group: String,
    pub start_state: JointState,
    pub goal: GoalConstraints,
    pub allowed_planning_time_secs: f64,
    pub num_planning_attempts: u32,
    pub planner_id: String,
}

/// Request to the external execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub group: String,
    pub trajectory: JointTrajectory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_state: Option<JointState>,
}

impl ExecutionRequest {
    /// Builds a request whose start state is the trajectory's first waypoint.
    pub fn new(group: impl Into<String>, trajectory: JointTrajectory) -> Self {
        let start_state = trajectory.start_state();
        Self {
            group: group.into(),
            trajectory,
            start_state,
        }
    }
}

/// One planned unit of motion.
#[derive(Debug, Clone)]
pub struct MotionSegment {
    pub kind: SegmentKind,
    pub group: ActuationGroupInfo,
    pub trajectory: JointTrajectory,
}

impl MotionSegment {
    pub fn duration(&self) -> Duration {
        self.trajectory.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(times: &[f64]) -> JointTrajectory {
        JointTrajectory {
            joint_names: vec!["j1".to_string(), "j2".to_string()],
            points: times
                .iter()
                .enumerate()
                .map(|(i, t)| TrajectoryPoint {
                    positions: vec![i as f64, -(i as f64)],
                    time_from_start: *t,
                })
                .collect(),
        }
    }

    #[test]
    fn test_duration_is_last_waypoint() {
        assert_eq!(trajectory(&[0.0, 1.0, 2.5]).duration(), Duration::from_millis(2500));
        assert_eq!(JointTrajectory::default().duration(), Duration::ZERO);
    }

    #[test]
    fn test_curate_restamps_first_point_only() {
        let mut traj = trajectory(&[0.0, 1.0, 2.0]);
        traj.curate();
        assert_eq!(traj.points[0].time_from_start, FIRST_WAYPOINT_TIME_SECS);
        assert_eq!(traj.points[1].time_from_start, 1.0);
        assert_eq!(traj.duration(), Duration::from_secs(2));
    }

    #[test]
    fn test_execution_request_takes_first_waypoint_as_start() {
        let request = ExecutionRequest::new("robot", trajectory(&[0.0, 1.0]));
        let start = request.start_state.unwrap();
        assert_eq!(start.names, vec!["j1", "j2"]);
        assert_eq!(start.positions, vec![0.0, -0.0]);
    }

    #[test]
    fn test_segment_kind_labels() {
        assert_eq!(SegmentKind::Retreat.to_string(), "retreat");
        assert_eq!(
            serde_json::to_string(&SegmentKind::Place).unwrap(),
            "\"place\""
        );
    }
}
