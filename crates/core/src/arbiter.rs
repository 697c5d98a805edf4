//! Exclusive ownership of the controller slot.
//!
//! Both actuation groups drive the same end effector, so at most one of
//! their controllers may be active. Every switch goes through the arbiter,
//! which always deactivates before it activates.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, warn};

use crate::config::{GroupRole, RobotConfig};
use crate::metrics::CONTROLLER_SWITCH_FAILURES;
use crate::services::{ControllerSwitcher, SwitchControllerRequest};

pub struct ControllerArbiter {
    switcher: Arc<dyn ControllerSwitcher>,
    transport: String,
    manipulator: String,
    /// Controllers the switching service last confirmed as active.
    active: Mutex<BTreeSet<String>>,
}

impl ControllerArbiter {
    pub fn new(switcher: Arc<dyn ControllerSwitcher>, robot: &RobotConfig) -> Self {
        Self {
            switcher,
            transport: robot.transport.controller.clone(),
            manipulator: robot.manipulator.controller.clone(),
            active: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn controller(&self, role: GroupRole) -> &str {
        match role {
            GroupRole::Transport => &self.transport,
            GroupRole::Manipulator => &self.manipulator,
        }
    }

    /// Best-effort activation. Returns whether the switch took effect.
    pub async fn activate(&self, controller: &str) -> bool {
        let ok = self
            .request(SwitchControllerRequest::start(controller), "activate", controller)
            .await;
        if ok {
            self.lock().insert(controller.to_string());
        }
        ok
    }

    /// Best-effort deactivation. Returns whether the switch took effect.
    pub async fn deactivate(&self, controller: &str) -> bool {
        let ok = self
            .request(SwitchControllerRequest::stop(controller), "deactivate", controller)
            .await;
        if ok {
            self.lock().remove(controller);
        }
        ok
    }

    /// Hand the controller slot to `role`: the other group's controller is
    /// deactivated first, then this group's is activated.
    ///
    /// A failed deactivation is logged and the activation still goes ahead.
    pub async fn handover(&self, role: GroupRole) -> bool {
        let released = self.deactivate(self.controller(role.other())).await;
        if !released {
            warn!(
                to = role.as_str(),
                "Handover continues although the other controller may still be active"
            );
        }
        self.activate(self.controller(role)).await
    }

    /// Deactivate both controllers. Returns true only if both switches
    /// succeeded.
    pub async fn deactivate_all(&self) -> bool {
        let transport = self.deactivate(&self.transport).await;
        let manipulator = self.deactivate(&self.manipulator).await;
        transport && manipulator
    }

    pub fn active_controllers(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    async fn request(&self, request: SwitchControllerRequest, action: &str, controller: &str) -> bool {
        match self.switcher.switch(request).await {
            Ok(true) => {
                debug!(controller = %controller, action, "Controller switched");
                true
            }
            Ok(false) => {
                error!(controller = %controller, action, "Controller did not switch");
                CONTROLLER_SWITCH_FAILURES.with_label_values(&[action]).inc();
                false
            }
            Err(e) => {
                error!(controller = %controller, action, error = %e, "Controller switch request failed");
                CONTROLLER_SWITCH_FAILURES.with_label_values(&[action]).inc();
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockControllerSwitcher;

    fn arbiter() -> (ControllerArbiter, Arc<MockControllerSwitcher>) {
        let switcher = Arc::new(MockControllerSwitcher::new());
        let arbiter = ControllerArbiter::new(switcher.clone(), &RobotConfig::default());
        (arbiter, switcher)
    }

    #[tokio::test]
    async fn test_handover_deactivates_before_activating() {
        let (arbiter, switcher) = arbiter();
        assert!(arbiter.handover(GroupRole::Transport).await);
        assert!(arbiter.handover(GroupRole::Manipulator).await);

        assert_eq!(arbiter.active_controllers(), vec!["robot_controller".to_string()]);
        assert_eq!(switcher.active(), vec!["robot_controller".to_string()]);
        assert_eq!(switcher.max_active(), 1);

        let history = switcher.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[2], SwitchControllerRequest::stop("robot_rail_controller"));
        assert_eq!(history[3], SwitchControllerRequest::start("robot_controller"));
    }

    #[tokio::test]
    async fn test_failed_switch_is_reported_not_raised() {
        let (arbiter, switcher) = arbiter();
        switcher.fail_controller("robot_controller");

        assert!(!arbiter.activate("robot_controller").await);
        assert!(arbiter.active_controllers().is_empty());
        assert!(arbiter.activate("robot_rail_controller").await);
        assert!(!arbiter.deactivate_all().await);
        assert!(arbiter.active_controllers().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_all_clears_slot() {
        let (arbiter, switcher) = arbiter();
        arbiter.handover(GroupRole::Manipulator).await;
        assert!(arbiter.deactivate_all().await);
        assert!(arbiter.active_controllers().is_empty());
        assert!(switcher.active().is_empty());
    }
}
