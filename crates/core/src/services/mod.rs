//! Robot collaborator services: motion planning, trajectory execution,
//! controller switching and the gripper.
//!
//! The orchestrator only sees the traits; [`HttpRobotClient`] is the
//! production implementation and `testing` holds the mocks.

mod config;
mod http;
mod traits;
mod types;

pub use config::ServicesConfig;
pub use http::HttpRobotClient;
pub use traits::{
    ControllerSwitcher, GripperControl, MotionPlanner, RobotServices, TrajectoryExecutor,
};
pub use types::{
    GripperRequest, GripperResponse, MotionCodeResponse, NamedMoveRequest, PlanResponse,
    ServiceError, StopRequest, SwitchControllerRequest, SwitchControllerResponse,
    SwitchStrictness, MOTION_PREEMPTED, MOTION_SUCCESS,
};
