//! Testing utilities and mock implementations of the robot services.
//!
//! The mocks run in tokio time, so tests using `start_paused = true`
//! can script multi-second cycles without waiting for them.
//!
//! # Example
//!
//! ```rust,ignore
//! use interceptor_core::testing::MockRobot;
//!
//! let robot = MockRobot::new();
//! robot.planner.set_duration("robot", 2.0);
//!
//! let orchestrator = InterceptOrchestrator::new(&config, robot.services(), queue, signal);
//! ```

mod mock_controllers;
mod mock_executor;
mod mock_planner;

use std::sync::Arc;

pub use mock_controllers::{MockControllerSwitcher, MockGripper};
pub use mock_executor::{MockExecutor, RecordedExecution};
pub use mock_planner::{trajectory_for, MockPlanner};

use crate::services::RobotServices;

/// One mock of each collaborator, kept for assertions.
#[derive(Clone, Default)]
pub struct MockRobot {
    pub planner: Arc<MockPlanner>,
    pub executor: Arc<MockExecutor>,
    pub controllers: Arc<MockControllerSwitcher>,
    pub gripper: Arc<MockGripper>,
}

impl MockRobot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The services bundle an orchestrator consumes.
    pub fn services(&self) -> RobotServices {
        RobotServices {
            planner: self.planner.clone(),
            executor: self.executor.clone(),
            controllers: self.controllers.clone(),
            gripper: self.gripper.clone(),
        }
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::geometry::{Orientation, Pose, Position, StampedPose};
    use crate::task::{TargetPoses, TargetTask};

    /// A stamped pose at the given position.
    pub fn stamped(x: f64, y: f64, z: f64, stamp: DateTime<Utc>) -> StampedPose {
        StampedPose::new(
            Pose::new(Position::new(x, y, z), Orientation::identity()),
            stamp,
        )
    }

    /// A task whose object reaches the pick point at `pick_at`.
    pub fn target_task(pick_at: DateTime<Utc>) -> TargetTask {
        TargetTask::new(TargetPoses {
            approach: stamped(0.5, 0.0, 1.0, pick_at),
            pick: stamped(0.5, 0.0, 0.85, pick_at),
            retreat: stamped(0.5, 0.0, 1.1, pick_at),
            place: stamped(-0.6, 0.4, 0.9, pick_at),
        })
    }
}
