//! Mock motion planner for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::motion::{JointTrajectory, MotionPlanRequest, TrajectoryPoint};
use crate::services::{MotionPlanner, ServiceError};

/// Planned duration used for groups without an explicit setting (seconds).
const DEFAULT_DURATION_SECS: f64 = 1.0;

#[derive(Debug, Default)]
struct PlannerState {
    durations: HashMap<String, f64>,
    failing_groups: HashSet<String>,
    failing_calls: HashSet<usize>,
    empty_groups: HashSet<String>,
    requests: Vec<MotionPlanRequest>,
}

/// Mock implementation of the MotionPlanner trait.
///
/// Every successful plan is a three-point trajectory whose last waypoint
/// sits at the configured duration for the request's group. Failures can
/// be scripted per group or per call index.
#[derive(Debug, Default)]
pub struct MockPlanner {
    state: Mutex<PlannerState>,
}

impl MockPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the planned duration for `group`.
    pub fn set_duration(&self, group: &str, secs: f64) {
        self.lock().durations.insert(group.to_string(), secs);
    }

    /// Make every plan for `group` fail.
    pub fn fail_group(&self, group: &str) {
        self.lock().failing_groups.insert(group.to_string());
    }

    /// Make the `index`-th plan call (zero-based) fail.
    pub fn fail_call(&self, index: usize) {
        self.lock().failing_calls.insert(index);
    }

    /// Make plans for `group` succeed with an empty trajectory.
    pub fn return_empty(&self, group: &str) {
        self.lock().empty_groups.insert(group.to_string());
    }

    /// All requests received, in order.
    pub fn requests(&self) -> Vec<MotionPlanRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, PlannerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Three-point trajectory for `group` ending at `duration` seconds.
pub fn trajectory_for(group: &str, duration: f64) -> JointTrajectory {
    JointTrajectory {
        joint_names: (1..=2).map(|i| format!("{}_joint_{}", group, i)).collect(),
        points: [0.0, duration / 2.0, duration]
            .iter()
            .enumerate()
            .map(|(i, t)| TrajectoryPoint {
                positions: vec![i as f64 * 0.1, i as f64 * -0.1],
                time_from_start: *t,
            })
            .collect(),
    }
}

#[async_trait]
impl MotionPlanner for MockPlanner {
    async fn plan(&self, request: MotionPlanRequest) -> Result<JointTrajectory, ServiceError> {
        let mut state = self.lock();
        let index = state.requests.len();
        let group = request.group.clone();
        state.requests.push(request);

        if state.failing_groups.contains(&group) || state.failing_calls.contains(&index) {
            return Err(ServiceError::Rejected(-1));
        }
        if state.empty_groups.contains(&group) {
            return Ok(JointTrajectory::default());
        }

        let duration = state
            .durations
            .get(&group)
            .copied()
            .unwrap_or(DEFAULT_DURATION_SECS);
        Ok(trajectory_for(&group, duration))
    }
}
