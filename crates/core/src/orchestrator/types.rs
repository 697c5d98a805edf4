//! Types for the intercept orchestrator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::motion::{MotionError, SegmentKind};

/// Errors that end or degrade an orchestration cycle.
#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    /// No usable trajectory for a segment.
    #[error("planning failed for {segment} segment: {reason}")]
    PlanningFailure { segment: SegmentKind, reason: String },

    /// The pick motion cannot finish before the object arrives.
    #[error("pick deadline missed by {late_by:?}")]
    DeadlineMiss { late_by: Duration },

    /// A trajectory was accepted but its execution failed.
    #[error("execution failed for {segment} segment: {reason}")]
    ExecutionFailure { segment: SegmentKind, reason: String },

    /// Attachment was never observed after the pick.
    #[error("no attachment observed within {waited:?}")]
    GraspTimeout { waited: Duration },

    /// Attachment was observed and then lost.
    #[error("grasp lost")]
    GraspLost,

    /// A controller switch did not take effect.
    #[error("failed to {action} controller {controller}")]
    ControllerSwitchFailure { controller: String, action: String },

    /// A group identity is not registered.
    #[error(transparent)]
    UnknownGroup(#[from] MotionError),

    /// The gripper did not acknowledge a request.
    #[error("gripper request failed (enable = {enable})")]
    GripperFailure { enable: bool },
}

impl OrchestratorError {
    /// Whether the error aborts the cycle. Non-fatal errors become cycle
    /// warnings and the pipeline carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            OrchestratorError::ExecutionFailure { .. }
                | OrchestratorError::ControllerSwitchFailure { .. }
        )
    }

    pub fn metric_label(&self) -> &'static str {
        match self {
            OrchestratorError::PlanningFailure { .. } => "planning_failure",
            OrchestratorError::DeadlineMiss { .. } => "deadline_miss",
            OrchestratorError::ExecutionFailure { .. } => "execution_failure",
            OrchestratorError::GraspTimeout { .. } => "grasp_timeout",
            OrchestratorError::GraspLost => "grasp_lost",
            OrchestratorError::ControllerSwitchFailure { .. } => "controller_switch_failure",
            OrchestratorError::UnknownGroup(_) => "unknown_group",
            OrchestratorError::GripperFailure { .. } => "gripper_failure",
        }
    }
}

/// Per-cycle permission to keep moving toward the target.
///
/// Starts set. Once cleared it stays cleared; clones share the value.
#[derive(Debug, Clone)]
pub struct ProceedFlag(Arc<AtomicBool>);

impl ProceedFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for ProceedFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Bookkeeping for the cycle in flight.
#[derive(Debug, Clone)]
pub(crate) struct ActiveCycle {
    pub task_id: Uuid,
    pub segment: SegmentKind,
    pub proceed: ProceedFlag,
}

/// Externally visible cycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    Busy {
        task_id: Uuid,
        segment: SegmentKind,
        proceed: bool,
    },
}

impl From<Option<&ActiveCycle>> for CycleState {
    fn from(cycle: Option<&ActiveCycle>) -> Self {
        match cycle {
            None => CycleState::Idle,
            Some(cycle) => CycleState::Busy {
                task_id: cycle.task_id,
                segment: cycle.segment,
                proceed: cycle.proceed.is_set(),
            },
        }
    }
}

/// What happened to one task.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub task_id: Uuid,
    /// `Err` carries the error that aborted the cycle.
    pub outcome: Result<(), OrchestratorError>,
    /// Segments whose trajectory was sent for execution, in order.
    pub segments_executed: Vec<SegmentKind>,
    /// Wait before the pick motion, if the deadline gate passed.
    pub pick_wait: Option<Duration>,
    /// Non-fatal errors met along the way.
    pub warnings: Vec<OrchestratorError>,
    /// Whether the return to the safe pose was accepted by the executor.
    pub safe_pose_reached: bool,
    pub duration: Duration,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            Ok(()) => "success",
            Err(e) => e.metric_label(),
        }
    }

    pub fn executed(&self, segment: SegmentKind) -> bool {
        self.segments_executed.contains(&segment)
    }
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Nothing queued.
    Idle,
    /// A cycle is already running; nothing was dequeued.
    Busy,
    Ran(CycleReport),
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the tick loop is running.
    pub running: bool,
    /// Whether a cycle holds the busy flag.
    pub busy: bool,
    pub cycle: CycleState,
    /// Tasks waiting in the queue.
    pub queue_length: usize,
    pub cycles_completed: u64,
    pub cycles_aborted: u64,
    /// Outcome label of the most recent cycle.
    pub last_outcome: Option<String>,
}
