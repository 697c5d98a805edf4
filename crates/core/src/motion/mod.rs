//! Motion requests: goal constraints, trajectories and segments.
//!
//! Trajectories are produced by the external planning service and executed
//! by the external execution service; this module only shapes the requests
//! and interprets the results.

mod config;
mod request_builder;
mod types;

pub use config::MotionConfig;
pub use request_builder::MotionRequestBuilder;
pub use types::{
    ExecutionRequest, GoalConstraints, JointState, JointTrajectory, MotionError,
    MotionPlanRequest, MotionSegment, SegmentKind, TrajectoryPoint, FIRST_WAYPOINT_TIME_SECS,
};
