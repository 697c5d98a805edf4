//! Mock trajectory executor for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::motion::{ExecutionRequest, JointState};
use crate::services::{NamedMoveRequest, ServiceError, TrajectoryExecutor, MOTION_PREEMPTED};

/// A recorded execution for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedExecution {
    /// The request that was submitted.
    pub request: ExecutionRequest,
    /// When execution started.
    pub started_at: Instant,
    /// Whether a stop request cut it short.
    pub preempted: bool,
}

#[derive(Debug, Default)]
struct ExecutorState {
    executions: Vec<RecordedExecution>,
    stops: Vec<String>,
    named_moves: Vec<NamedMoveRequest>,
    failing_groups: HashMap<String, i32>,
    fail_named_moves: bool,
    unavailable_state: HashSet<String>,
}

/// Mock implementation of the TrajectoryExecutor trait.
///
/// An execution takes as long as its trajectory (in tokio time) unless
/// `stop` is called for its group, in which case it returns the preempted
/// code. Named moves complete immediately.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<ExecutorState>,
    stop_signals: Mutex<HashMap<String, Arc<Notify>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every execution on `group` fail with `code`.
    pub fn fail_group(&self, group: &str, code: i32) {
        self.lock().failing_groups.insert(group.to_string(), code);
    }

    /// Make every named move fail.
    pub fn fail_named_moves(&self) {
        self.lock().fail_named_moves = true;
    }

    /// Make `current_state` fail for `group`.
    pub fn state_unavailable(&self, group: &str) {
        self.lock().unavailable_state.insert(group.to_string());
    }

    pub fn executions(&self) -> Vec<RecordedExecution> {
        self.lock().executions.clone()
    }

    /// Executions submitted for `group`.
    pub fn executions_for(&self, group: &str) -> Vec<RecordedExecution> {
        self.lock()
            .executions
            .iter()
            .filter(|e| e.request.group == group)
            .cloned()
            .collect()
    }

    /// Groups that received a stop request, in order.
    pub fn stops(&self) -> Vec<String> {
        self.lock().stops.clone()
    }

    pub fn clear_stops(&self) {
        self.lock().stops.clear();
    }

    pub fn named_moves(&self) -> Vec<NamedMoveRequest> {
        self.lock().named_moves.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stop_signal(&self, group: &str) -> Arc<Notify> {
        let mut signals = self
            .stop_signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(signals.entry(group.to_string()).or_default())
    }
}

#[async_trait]
impl TrajectoryExecutor for MockExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<(), ServiceError> {
        let index = {
            let mut state = self.lock();
            state.executions.push(RecordedExecution {
                request: request.clone(),
                started_at: Instant::now(),
                preempted: false,
            });
            if let Some(code) = state.failing_groups.get(&request.group) {
                return Err(ServiceError::Rejected(*code));
            }
            state.executions.len() - 1
        };

        let signal = self.stop_signal(&request.group);
        let stopped = signal.notified();
        tokio::select! {
            _ = tokio::time::sleep(request.trajectory.duration()) => Ok(()),
            _ = stopped => {
                self.lock().executions[index].preempted = true;
                Err(ServiceError::Rejected(MOTION_PREEMPTED))
            }
        }
    }

    async fn stop(&self, group: &str) -> Result<(), ServiceError> {
        self.lock().stops.push(group.to_string());
        self.stop_signal(group).notify_waiters();
        Ok(())
    }

    async fn move_to_named(
        &self,
        group: &str,
        target: &str,
        wait: bool,
    ) -> Result<(), ServiceError> {
        let mut state = self.lock();
        state.named_moves.push(NamedMoveRequest {
            group: group.to_string(),
            target: target.to_string(),
            wait,
        });
        if state.fail_named_moves {
            return Err(ServiceError::Rejected(-1));
        }
        Ok(())
    }

    async fn current_state(&self, group: &str) -> Result<JointState, ServiceError> {
        if self.lock().unavailable_state.contains(group) {
            return Err(ServiceError::ConnectionFailed(format!(
                "no joint state for {}",
                group
            )));
        }
        Ok(JointState {
            names: (1..=2).map(|i| format!("{}_joint_{}", group, i)).collect(),
            positions: vec![0.0, 0.0],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::trajectory_for;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_execution_lasts_trajectory_duration() {
        let executor = MockExecutor::new();
        let start = Instant::now();
        executor
            .execute(ExecutionRequest::new("robot", trajectory_for("robot", 2.0)))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(!executor.executions()[0].preempted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_preempts_running_execution() {
        let executor = Arc::new(MockExecutor::new());
        let stopper = executor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            stopper.stop("robot").await.unwrap();
        });

        let start = Instant::now();
        let err = executor
            .execute(ExecutionRequest::new("robot", trajectory_for("robot", 2.0)))
            .await
            .unwrap_err();
        assert!(err.is_preempted());
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(executor.executions()[0].preempted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_execution_has_no_effect() {
        let executor = MockExecutor::new();
        executor.stop("robot").await.unwrap();
        executor
            .execute(ExecutionRequest::new("robot", trajectory_for("robot", 0.5)))
            .await
            .unwrap();
        assert_eq!(executor.stops(), vec!["robot".to_string()]);
    }
}
