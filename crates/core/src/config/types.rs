use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::motion::MotionConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::services::ServicesConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// The two cooperating actuation groups and how they grasp.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    /// Coarse, large-workspace positioning stage.
    #[serde(default = "default_transport")]
    pub transport: ActuationGroupInfo,
    /// Fine end-effector positioning stage.
    #[serde(default = "default_manipulator")]
    pub manipulator: ActuationGroupInfo,
    /// Rotation about the vertical axis applied to every target pose before
    /// planning (radians). The place pose adds a half turn on top.
    #[serde(default = "default_grasp_angle")]
    pub preferred_grasp_angle: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            manipulator: default_manipulator(),
            preferred_grasp_angle: default_grasp_angle(),
        }
    }
}

impl RobotConfig {
    pub fn group(&self, role: GroupRole) -> &ActuationGroupInfo {
        match role {
            GroupRole::Transport => &self.transport,
            GroupRole::Manipulator => &self.manipulator,
        }
    }
}

fn default_grasp_angle() -> f64 {
    std::f64::consts::FRAC_PI_2
}

fn default_transport() -> ActuationGroupInfo {
    ActuationGroupInfo {
        group: "robot_rail".to_string(),
        controller: "robot_rail_controller".to_string(),
        safe_pose: "RAIL_ARM_WAIT".to_string(),
        end_effector_link: default_end_effector_link(),
    }
}

fn default_manipulator() -> ActuationGroupInfo {
    ActuationGroupInfo {
        group: "robot".to_string(),
        controller: "robot_controller".to_string(),
        safe_pose: "ARM_WAIT".to_string(),
        end_effector_link: default_end_effector_link(),
    }
}

fn default_end_effector_link() -> String {
    "vacuum_gripper_link".to_string()
}

/// Static descriptor of one actuation group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActuationGroupInfo {
    /// Planning group identity.
    pub group: String,
    /// Controller that must be active for this group to move.
    pub controller: String,
    /// Named safe/wait pose known to the execution service.
    pub safe_pose: String,
    /// Link whose pose the goal constraints refer to.
    #[serde(default = "default_end_effector_link")]
    pub end_effector_link: String,
}

/// Which of the two groups a segment runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Transport,
    Manipulator,
}

impl GroupRole {
    pub fn other(self) -> Self {
        match self {
            GroupRole::Transport => GroupRole::Manipulator,
            GroupRole::Manipulator => GroupRole::Transport,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Transport => "transport",
            GroupRole::Manipulator => "manipulator",
        }
    }
}
