//! Planning budget and goal tolerances.

use serde::{Deserialize, Serialize};

/// Configuration for motion requests sent to the planning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Time budget handed to the planner per request (seconds).
    #[serde(default = "default_planning_time")]
    pub allowed_planning_time_secs: f64,

    /// Number of planning attempts the planner may make per request.
    #[serde(default = "default_planning_attempts")]
    pub planning_attempts: u32,

    /// Planner identifier forwarded to the planning service.
    #[serde(default = "default_planner_id")]
    pub planner_id: String,

    /// Positional tolerance per axis (meters).
    #[serde(default = "default_fine_tolerance")]
    pub position_tolerance: f64,

    /// Roll and pitch tolerance (radians).
    #[serde(default = "default_fine_tolerance")]
    pub orientation_tolerance: f64,

    /// Yaw tolerance for approach, pick and retreat (radians).
    #[serde(default = "default_yaw_tolerance")]
    pub yaw_tolerance: f64,

    /// Yaw tolerance for the place segment (radians).
    /// Coarse placement does not need tight yaw alignment.
    #[serde(default = "default_place_yaw_tolerance")]
    pub place_yaw_tolerance: f64,
}

fn default_planning_time() -> f64 {
    1.0
}

fn default_planning_attempts() -> u32 {
    4
}

fn default_planner_id() -> String {
    "RRTConnectkConfigDefault".to_string()
}

fn default_fine_tolerance() -> f64 {
    0.01
}

fn default_yaw_tolerance() -> f64 {
    0.1
}

fn default_place_yaw_tolerance() -> f64 {
    3.14
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            allowed_planning_time_secs: default_planning_time(),
            planning_attempts: default_planning_attempts(),
            planner_id: default_planner_id(),
            position_tolerance: default_fine_tolerance(),
            orientation_tolerance: default_fine_tolerance(),
            yaw_tolerance: default_yaw_tolerance(),
            place_yaw_tolerance: default_place_yaw_tolerance(),
        }
    }
}
