//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of the orchestration cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Start the tick loop when the server starts.
    /// When disabled, the loop is started via the API.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often the tick loop looks for a task (milliseconds).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// How long to wait for attachment after the pick motion (milliseconds).
    #[serde(default = "default_grasp_timeout")]
    pub grasp_timeout_ms: u64,

    /// Polling interval while waiting for attachment (milliseconds).
    #[serde(default = "default_attach_poll_interval")]
    pub attach_poll_interval_ms: u64,

    /// Sampling period of the stop-on-attach monitor (milliseconds).
    #[serde(default = "default_attach_monitor_interval")]
    pub attach_monitor_interval_ms: u64,

    /// Sampling period of the stop-on-detach monitor (milliseconds).
    #[serde(default = "default_detach_monitor_interval")]
    pub detach_monitor_interval_ms: u64,

    /// Pause after starting a non-blocking return to the safe pose, before
    /// the controllers are torn down (milliseconds).
    #[serde(default = "default_safe_return_settle")]
    pub safe_return_settle_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_tick_interval() -> u64 {
    100
}

fn default_grasp_timeout() -> u64 {
    2000 // 2 seconds
}

fn default_attach_poll_interval() -> u64 {
    10
}

fn default_attach_monitor_interval() -> u64 {
    100
}

fn default_detach_monitor_interval() -> u64 {
    200
}

fn default_safe_return_settle() -> u64 {
    3000 // 3 seconds
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tick_interval_ms: default_tick_interval(),
            grasp_timeout_ms: default_grasp_timeout(),
            attach_poll_interval_ms: default_attach_poll_interval(),
            attach_monitor_interval_ms: default_attach_monitor_interval(),
            detach_monitor_interval_ms: default_detach_monitor_interval(),
            safe_return_settle_ms: default_safe_return_settle(),
        }
    }
}

impl OrchestratorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn grasp_timeout(&self) -> Duration {
        Duration::from_millis(self.grasp_timeout_ms)
    }

    pub fn attach_poll_interval(&self) -> Duration {
        Duration::from_millis(self.attach_poll_interval_ms)
    }

    pub fn attach_monitor_interval(&self) -> Duration {
        Duration::from_millis(self.attach_monitor_interval_ms)
    }

    pub fn detach_monitor_interval(&self) -> Duration {
        Duration::from_millis(self.detach_monitor_interval_ms)
    }

    pub fn safe_return_settle(&self) -> Duration {
        Duration::from_millis(self.safe_return_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.grasp_timeout(), Duration::from_secs(2));
        assert_eq!(config.attach_poll_interval_ms, 10);
        assert_eq!(config.attach_monitor_interval_ms, 100);
        assert_eq!(config.detach_monitor_interval_ms, 200);
        assert_eq!(config.safe_return_settle(), Duration::from_secs(3));
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            enabled = false
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.grasp_timeout_ms, 2000);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            enabled = true
            tick_interval_ms = 50
            grasp_timeout_ms = 1500
            attach_poll_interval_ms = 5
            attach_monitor_interval_ms = 20
            detach_monitor_interval_ms = 40
            safe_return_settle_ms = 0
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.grasp_timeout_ms, 1500);
        assert_eq!(config.attach_poll_interval_ms, 5);
        assert_eq!(config.attach_monitor_interval_ms, 20);
        assert_eq!(config.detach_monitor_interval_ms, 40);
        assert_eq!(config.safe_return_settle_ms, 0);
    }
}
