//! Goal-constraint construction for planning requests.

use std::collections::HashMap;

use crate::config::RobotConfig;
use crate::geometry::StampedPose;

use super::config::MotionConfig;
use super::types::{GoalConstraints, MotionError};

/// Turns a target pose and group identity into goal constraints.
///
/// Holds the group → end-effector table; everything else is fixed at
/// construction, so `build` is a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct MotionRequestBuilder {
    end_effectors: HashMap<String, String>,
    position_tolerance: f64,
    orientation_tolerance: f64,
}

impl MotionRequestBuilder {
    pub fn new(robot: &RobotConfig, motion: &MotionConfig) -> Self {
        let end_effectors = [&robot.transport, &robot.manipulator]
            .into_iter()
            .map(|info| (info.group.clone(), info.end_effector_link.clone()))
            .collect();

        Self {
            end_effectors,
            position_tolerance: motion.position_tolerance,
            orientation_tolerance: motion.orientation_tolerance,
        }
    }

    /// Build goal constraints for `group` reaching `pose`, with the given
    /// tolerance about the vertical axis.
    pub fn build(
        &self,
        pose: &StampedPose,
        group: &str,
        yaw_tolerance: f64,
    ) -> Result<GoalConstraints, MotionError> {
        let link_name = self
            .end_effectors
            .get(group)
            .ok_or_else(|| MotionError::UnknownGroup(group.to_string()))?;

        Ok(GoalConstraints {
            link_name: link_name.clone(),
            target: *pose,
            position_tolerance: [self.position_tolerance; 3],
            orientation_tolerance: [
                self.orientation_tolerance,
                self.orientation_tolerance,
                yaw_tolerance,
            ],
        })
    }
}
