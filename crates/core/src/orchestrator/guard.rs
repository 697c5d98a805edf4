//! Cleanup bound to one orchestration cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::arbiter::ControllerArbiter;
use crate::attachment::AttachmentMonitor;
use crate::config::{ActuationGroupInfo, GroupRole};
use crate::services::RobotServices;

use super::types::{ActiveCycle, ProceedFlag};

/// Move the transport group to its safe pose. With `wait == false` this
/// returns once the motion has been accepted.
pub(crate) async fn move_to_safe_pose(
    services: &RobotServices,
    arbiter: &ControllerArbiter,
    transport: &ActuationGroupInfo,
    wait: bool,
) -> bool {
    arbiter.handover(GroupRole::Transport).await;
    match services
        .executor
        .move_to_named(&transport.group, &transport.safe_pose, wait)
        .await
    {
        Ok(()) => {
            info!(group = %transport.group, pose = %transport.safe_pose, wait, "Returning to safe pose");
            true
        }
        Err(e) => {
            error!(group = %transport.group, pose = %transport.safe_pose, error = %e, "Failed to return to safe pose");
            false
        }
    }
}

/// Release the gripper, logging any failure.
pub(crate) async fn release_gripper(services: &RobotServices) -> bool {
    match services.gripper.set_enabled(false).await {
        Ok(true) => true,
        Ok(false) => {
            warn!("Gripper did not acknowledge release");
            false
        }
        Err(e) => {
            warn!(error = %e, "Gripper release request failed");
            false
        }
    }
}

pub(crate) struct GuardContext {
    pub services: RobotServices,
    pub arbiter: Arc<ControllerArbiter>,
    pub monitor: Arc<AttachmentMonitor>,
    pub transport: ActuationGroupInfo,
    pub busy: Arc<AtomicBool>,
    pub cycle: Arc<Mutex<Option<ActiveCycle>>>,
    pub settle: Duration,
}

impl GuardContext {
    async fn cleanup(self, proceed: ProceedFlag) -> bool {
        self.monitor.stop().await;

        let reached = if proceed.is_set() {
            let accepted =
                move_to_safe_pose(&self.services, &self.arbiter, &self.transport, false).await;
            tokio::time::sleep(self.settle).await;
            accepted
        } else {
            move_to_safe_pose(&self.services, &self.arbiter, &self.transport, true).await
        };

        release_gripper(&self.services).await;
        if !self.arbiter.deactivate_all().await {
            warn!("Controllers may still be active after cleanup");
        }
        self.release_busy();
        reached
    }

    fn release_busy(&self) {
        *self
            .cycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Returns the robot to an idle, safe state when a cycle ends.
///
/// Call [`ExecutionGuard::release`] on every exit path. If the guard is
/// dropped instead (the cycle future was cancelled), the same cleanup is
/// spawned onto the runtime.
pub(crate) struct ExecutionGuard {
    context: Option<GuardContext>,
    proceed: ProceedFlag,
}

impl ExecutionGuard {
    pub fn new(context: GuardContext, proceed: ProceedFlag) -> Self {
        Self {
            context: Some(context),
            proceed,
        }
    }

    /// Run the cleanup. Returns whether the safe-pose move was accepted.
    pub async fn release(mut self) -> bool {
        match self.context.take() {
            Some(context) => context.cleanup(self.proceed.clone()).await,
            None => false,
        }
    }
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };

        warn!("Cycle interrupted, cleaning up in the background");
        self.proceed.clear();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let proceed = self.proceed.clone();
                handle.spawn(async move {
                    context.cleanup(proceed).await;
                });
            }
            Err(_) => {
                context.monitor.abort();
                context.release_busy();
            }
        }
    }
}
