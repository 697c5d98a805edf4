use super::{types::ActuationGroupInfo, types::Config, ConfigError};

/// Validate configuration.
///
/// Rejects configurations the orchestrator cannot run safely with:
/// - server port 0
/// - empty group, controller, safe pose or end-effector names
/// - both groups sharing a planning group or a controller
/// - zero intervals or timeouts in the orchestrator section
/// - non-positive tolerances or a zero planning budget
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    validate_group("robot.transport", &config.robot.transport)?;
    validate_group("robot.manipulator", &config.robot.manipulator)?;

    if config.robot.transport.group == config.robot.manipulator.group {
        return Err(invalid(
            "robot.transport and robot.manipulator must use different planning groups",
        ));
    }
    if config.robot.transport.controller == config.robot.manipulator.controller {
        return Err(invalid(
            "robot.transport and robot.manipulator must use different controllers",
        ));
    }
    if !config.robot.preferred_grasp_angle.is_finite() {
        return Err(invalid("robot.preferred_grasp_angle must be finite"));
    }

    let orch = &config.orchestrator;
    for (name, value) in [
        ("orchestrator.tick_interval_ms", orch.tick_interval_ms),
        ("orchestrator.grasp_timeout_ms", orch.grasp_timeout_ms),
        ("orchestrator.attach_poll_interval_ms", orch.attach_poll_interval_ms),
        (
            "orchestrator.attach_monitor_interval_ms",
            orch.attach_monitor_interval_ms,
        ),
        (
            "orchestrator.detach_monitor_interval_ms",
            orch.detach_monitor_interval_ms,
        ),
    ] {
        if value == 0 {
            return Err(invalid(&format!("{} cannot be 0", name)));
        }
    }

    let motion = &config.motion;
    for (name, value) in [
        ("motion.position_tolerance", motion.position_tolerance),
        ("motion.orientation_tolerance", motion.orientation_tolerance),
        ("motion.yaw_tolerance", motion.yaw_tolerance),
        ("motion.place_yaw_tolerance", motion.place_yaw_tolerance),
        ("motion.allowed_planning_time_secs", motion.allowed_planning_time_secs),
    ] {
        if !(value > 0.0) {
            return Err(invalid(&format!("{} must be positive", name)));
        }
    }
    if motion.planning_attempts == 0 {
        return Err(invalid("motion.planning_attempts cannot be 0"));
    }

    if config.services.url.trim().is_empty() {
        return Err(invalid("services.url cannot be empty"));
    }

    Ok(())
}

fn validate_group(section: &str, info: &ActuationGroupInfo) -> Result<(), ConfigError> {
    for (field, value) in [
        ("group", &info.group),
        ("controller", &info.controller),
        ("safe_pose", &info.safe_pose),
        ("end_effector_link", &info.end_effector_link),
    ] {
        if value.trim().is_empty() {
            return Err(invalid(&format!("{}.{} cannot be empty", section, field)));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_shared_controller_fails() {
        let mut config = Config::default();
        config.robot.manipulator.controller = config.robot.transport.controller.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("different controllers"));
    }

    #[test]
    fn test_validate_shared_group_fails() {
        let mut config = Config::default();
        config.robot.manipulator.group = config.robot.transport.group.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("different planning groups"));
    }

    #[test]
    fn test_validate_empty_safe_pose_fails() {
        let mut config = Config::default();
        config.robot.transport.safe_pose = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("robot.transport.safe_pose"));
    }

    #[test]
    fn test_validate_zero_grasp_timeout_fails() {
        let mut config = Config::default();
        config.orchestrator.grasp_timeout_ms = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("grasp_timeout_ms"));
    }

    #[test]
    fn test_validate_nan_tolerance_fails() {
        let mut config = Config::default();
        config.motion.yaw_tolerance = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_planning_attempts_fails() {
        let mut config = Config::default();
        config.motion.planning_attempts = 0;
        assert!(validate_config(&config).is_err());
    }
}
