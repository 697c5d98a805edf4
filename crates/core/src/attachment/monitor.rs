use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::orchestrator::ProceedFlag;
use crate::services::TrajectoryExecutor;

use super::signal::AttachmentSignal;

/// What the monitor reacts to.
#[derive(Debug, Clone)]
pub enum MonitorMode {
    /// Halt `group` as soon as the signal reads true.
    StopOnAttach { group: String },
    /// Once the signal has read true, a false reading clears `proceed` and
    /// halts every group in `groups`.
    StopOnDetach {
        groups: Vec<String>,
        proceed: ProceedFlag,
    },
}

impl MonitorMode {
    fn name(&self) -> &'static str {
        match self {
            MonitorMode::StopOnAttach { .. } => "stop_on_attach",
            MonitorMode::StopOnDetach { .. } => "stop_on_detach",
        }
    }
}

struct ActiveMonitor {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodic observer of the attachment signal.
///
/// At most one monitor task is alive: starting a new one stops the
/// previous one first. The task only stops motion; it never starts any.
pub struct AttachmentMonitor {
    signal: AttachmentSignal,
    executor: Arc<dyn TrajectoryExecutor>,
    active: Mutex<Option<ActiveMonitor>>,
}

impl AttachmentMonitor {
    pub fn new(signal: AttachmentSignal, executor: Arc<dyn TrajectoryExecutor>) -> Self {
        Self {
            signal,
            executor,
            active: Mutex::new(None),
        }
    }

    /// Spawn a monitor sampling every `period`, replacing any running one.
    pub async fn start(&self, mode: MonitorMode, period: Duration) {
        self.stop().await;

        debug!(mode = mode.name(), period_ms = period.as_millis() as u64, "Starting attachment monitor");
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run(
            mode,
            self.signal.clone(),
            Arc::clone(&self.executor),
            period,
            stop_rx,
        ));

        let previous = self.lock().replace(ActiveMonitor { stop_tx, handle });
        if let Some(previous) = previous {
            // Lost a race with a concurrent start.
            previous.handle.abort();
        }
    }

    /// Stop the running monitor, if any, and wait for it to exit.
    pub async fn stop(&self) {
        let active = self.lock().take();
        if let Some(active) = active {
            let _ = active.stop_tx.send(());
            let _ = active.handle.await;
        }
    }

    /// Cancel the running monitor without waiting.
    pub fn abort(&self) {
        if let Some(active) = self.lock().take() {
            active.handle.abort();
        }
    }

    /// Whether a monitor task is still running.
    pub fn is_active(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveMonitor>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AttachmentMonitor {
    fn drop(&mut self) {
        self.abort();
    }
}

async fn run(
    mode: MonitorMode,
    signal: AttachmentSignal,
    executor: Arc<dyn TrajectoryExecutor>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seen_attached = signal.is_attached();

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let attached = signal.is_attached();
                match &mode {
                    MonitorMode::StopOnAttach { group } => {
                        if attached {
                            info!(group = %group, "Attachment detected, stopping motion");
                            stop_group(executor.as_ref(), group).await;
                            break;
                        }
                    }
                    MonitorMode::StopOnDetach { groups, proceed } => {
                        if attached {
                            seen_attached = true;
                        } else if seen_attached {
                            warn!("Grasp lost, stopping all motion");
                            proceed.clear();
                            for group in groups {
                                stop_group(executor.as_ref(), group).await;
                            }
                            break;
                        }
                    }
                }
            }
        }
    }
    debug!(mode = mode.name(), "Attachment monitor exited");
}

async fn stop_group(executor: &dyn TrajectoryExecutor, group: &str) {
    if let Err(e) = executor.stop(group).await {
        warn!(group = %group, error = %e, "Failed to stop group");
    }
}
