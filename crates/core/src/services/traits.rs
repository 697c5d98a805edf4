//! Trait definitions for the robot collaborator services.

use std::sync::Arc;

use async_trait::async_trait;

use crate::motion::{ExecutionRequest, JointState, JointTrajectory, MotionPlanRequest};

use super::types::{ServiceError, SwitchControllerRequest};

/// Black-box motion planning service.
#[async_trait]
pub trait MotionPlanner: Send + Sync {
    /// Plans a trajectory satisfying the request. Any non-success answer is
    /// an error.
    async fn plan(&self, request: MotionPlanRequest) -> Result<JointTrajectory, ServiceError>;
}

/// Executes trajectories on physical or simulated joints.
#[async_trait]
pub trait TrajectoryExecutor: Send + Sync {
    /// Runs the trajectory; returns once motion has finished or was stopped.
    async fn execute(&self, request: ExecutionRequest) -> Result<(), ServiceError>;

    /// Halts any motion of `group` currently in flight.
    async fn stop(&self, group: &str) -> Result<(), ServiceError>;

    /// Moves `group` to a named target. With `wait == false` the call
    /// returns as soon as the motion has been started.
    async fn move_to_named(&self, group: &str, target: &str, wait: bool)
        -> Result<(), ServiceError>;

    /// Current joint configuration of `group`.
    async fn current_state(&self, group: &str) -> Result<JointState, ServiceError>;
}

/// Controller manager that activates and deactivates controllers.
#[async_trait]
pub trait ControllerSwitcher: Send + Sync {
    /// Returns the service's `ok` flag.
    async fn switch(&self, request: SwitchControllerRequest) -> Result<bool, ServiceError>;
}

/// Grasp actuator.
#[async_trait]
pub trait GripperControl: Send + Sync {
    /// Returns the service's `success` flag.
    async fn set_enabled(&self, enable: bool) -> Result<bool, ServiceError>;
}

/// The four collaborators an orchestrator drives.
#[derive(Clone)]
pub struct RobotServices {
    pub planner: Arc<dyn MotionPlanner>,
    pub executor: Arc<dyn TrajectoryExecutor>,
    pub controllers: Arc<dyn ControllerSwitcher>,
    pub gripper: Arc<dyn GripperControl>,
}

impl RobotServices {
    /// Uses one implementation for all four roles.
    pub fn from_single<T>(service: Arc<T>) -> Self
    where
        T: MotionPlanner + TrajectoryExecutor + ControllerSwitcher + GripperControl + 'static,
    {
        Self {
            planner: service.clone(),
            executor: service.clone(),
            controllers: service.clone(),
            gripper: service,
        }
    }
}
