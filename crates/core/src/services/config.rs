//! Collaborator service configuration.

use serde::{Deserialize, Serialize};

/// Where the robot collaborator services live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Base URL of the HTTP robot service.
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds. Trajectory execution requests are
    /// allowed to run for as long as the trajectory lasts on top of this.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Timeout in seconds for a blocking named move, which only answers
    /// once the group has arrived.
    #[serde(default = "default_motion_timeout")]
    pub motion_timeout_secs: u64,

    /// Wait for the service health endpoint before starting.
    #[serde(default = "default_wait_for_ready")]
    pub wait_for_ready: bool,

    /// How long to wait for the service at startup (seconds).
    #[serde(default = "default_timeout")]
    pub ready_timeout_secs: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:9090".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_motion_timeout() -> u64 {
    60
}

fn default_wait_for_ready() -> bool {
    true
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
            motion_timeout_secs: default_motion_timeout(),
            wait_for_ready: default_wait_for_ready(),
            ready_timeout_secs: default_timeout(),
        }
    }
}
