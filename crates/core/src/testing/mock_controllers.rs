//! Mock controller switcher and gripper for testing.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::attachment::AttachmentSignal;
use crate::services::{ControllerSwitcher, GripperControl, ServiceError, SwitchControllerRequest};

#[derive(Debug, Default)]
struct SwitcherState {
    active: BTreeSet<String>,
    history: Vec<SwitchControllerRequest>,
    max_active: usize,
    failing: HashSet<String>,
}

/// Mock implementation of the ControllerSwitcher trait.
///
/// Tracks which controllers are active and the largest number that were
/// ever active at once.
#[derive(Debug, Default)]
pub struct MockControllerSwitcher {
    state: Mutex<SwitcherState>,
}

impl MockControllerSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `ok: false` to any request naming `controller`.
    pub fn fail_controller(&self, controller: &str) {
        self.lock().failing.insert(controller.to_string());
    }

    pub fn active(&self) -> Vec<String> {
        self.lock().active.iter().cloned().collect()
    }

    pub fn history(&self) -> Vec<SwitchControllerRequest> {
        self.lock().history.clone()
    }

    /// Most controllers that were active simultaneously.
    pub fn max_active(&self) -> usize {
        self.lock().max_active
    }

    fn lock(&self) -> MutexGuard<'_, SwitcherState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ControllerSwitcher for MockControllerSwitcher {
    async fn switch(&self, request: SwitchControllerRequest) -> Result<bool, ServiceError> {
        let mut state = self.lock();
        state.history.push(request.clone());

        let refused = request
            .start_controllers
            .iter()
            .chain(&request.stop_controllers)
            .any(|c| state.failing.contains(c));
        if refused {
            return Ok(false);
        }

        for controller in &request.stop_controllers {
            state.active.remove(controller);
        }
        for controller in &request.start_controllers {
            state.active.insert(controller.clone());
        }
        state.max_active = state.max_active.max(state.active.len());
        Ok(true)
    }
}

#[derive(Debug, Default)]
struct GripperState {
    commands: Vec<bool>,
    fail_enable: bool,
    fail_release: bool,
    sensor: Option<AttachmentSignal>,
}

/// Mock implementation of the GripperControl trait.
///
/// With a linked sensor, a successful release reports the object as
/// detached.
#[derive(Debug, Default)]
pub struct MockGripper {
    state: Mutex<GripperState>,
}

impl MockGripper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `success: false` to enable requests.
    pub fn fail_enable(&self) {
        self.lock().fail_enable = true;
    }

    /// Answer `success: false` to release requests.
    pub fn fail_release(&self) {
        self.lock().fail_release = true;
    }

    /// Clear `sensor` whenever the gripper is released.
    pub fn link_sensor(&self, sensor: AttachmentSignal) {
        self.lock().sensor = Some(sensor);
    }

    /// Every command received, in order.
    pub fn commands(&self) -> Vec<bool> {
        self.lock().commands.clone()
    }

    pub fn last_command(&self) -> Option<bool> {
        self.lock().commands.last().copied()
    }

    fn lock(&self) -> MutexGuard<'_, GripperState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl GripperControl for MockGripper {
    async fn set_enabled(&self, enable: bool) -> Result<bool, ServiceError> {
        let mut state = self.lock();
        state.commands.push(enable);
        let failed = if enable {
            state.fail_enable
        } else {
            state.fail_release
        };
        if !enable && !failed {
            if let Some(sensor) = &state.sensor {
                sensor.set(false);
            }
        }
        Ok(!failed)
    }
}
