//! Intercept orchestrator implementation.
//!
//! Each tick serves at most one task:
//! - Approach: transport group to the approach pose
//! - Pick: manipulator group to the pick pose, timed to the object's arrival
//! - Retreat: manipulator group away from the pick point, grasp monitored
//! - Place: transport group to the place pose, then release
//! - Return: transport group back to its safe pose (always, via the guard)

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::arbiter::ControllerArbiter;
use crate::attachment::{AttachmentMonitor, AttachmentSignal, MonitorMode};
use crate::clock::{Clock, TokioClock};
use crate::config::{Config, GroupRole, RobotConfig};
use crate::deadline::DeadlineScheduler;
use crate::geometry::StampedPose;
use crate::metrics::{CYCLES_TOTAL, CYCLE_DURATION, DEADLINE_SLACK, SEGMENT_EXECUTIONS};
use crate::motion::{
    ExecutionRequest, MotionConfig, MotionPlanRequest, MotionRequestBuilder, MotionSegment,
    SegmentKind,
};
use crate::services::RobotServices;
use crate::task::{TargetTask, TaskQueue};

use super::config::OrchestratorConfig;
use super::guard::{move_to_safe_pose, release_gripper, ExecutionGuard, GuardContext};
use super::types::{
    ActiveCycle, CycleReport, CycleState, OrchestratorError, OrchestratorStatus, ProceedFlag,
    TickOutcome,
};

#[derive(Debug, Default)]
struct CycleStats {
    completed: u64,
    aborted: u64,
    last_outcome: Option<String>,
}

/// What a cycle accumulated before it ended.
#[derive(Debug, Default)]
struct CycleProgress {
    segments_executed: Vec<SegmentKind>,
    pick_wait: Option<std::time::Duration>,
    warnings: Vec<OrchestratorError>,
}

impl CycleProgress {
    /// Keep a non-fatal error as a warning; hand a fatal one back.
    fn tolerate(&mut self, error: OrchestratorError) -> Result<(), OrchestratorError> {
        if error.is_fatal() {
            return Err(error);
        }
        warn!(error = %error, "Continuing after non-fatal error");
        self.warnings.push(error);
        Ok(())
    }
}

/// The intercept orchestrator - serves queued tasks one cycle at a time.
pub struct InterceptOrchestrator {
    config: OrchestratorConfig,
    motion: MotionConfig,
    robot: RobotConfig,
    builder: MotionRequestBuilder,
    services: RobotServices,
    queue: TaskQueue,
    attachment: AttachmentSignal,
    monitor: Arc<AttachmentMonitor>,
    arbiter: Arc<ControllerArbiter>,
    clock: Arc<dyn Clock>,

    // Runtime state
    busy: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    cycle: Arc<Mutex<Option<ActiveCycle>>>,
    stats: Mutex<CycleStats>,
    shutdown_tx: broadcast::Sender<()>,
}

impl InterceptOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: &Config,
        services: RobotServices,
        queue: TaskQueue,
        attachment: AttachmentSignal,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let monitor = Arc::new(AttachmentMonitor::new(
            attachment.clone(),
            Arc::clone(&services.executor),
        ));
        let arbiter = Arc::new(ControllerArbiter::new(
            Arc::clone(&services.controllers),
            &config.robot,
        ));

        Self {
            config: config.orchestrator.clone(),
            motion: config.motion.clone(),
            robot: config.robot.clone(),
            builder: MotionRequestBuilder::new(&config.robot, &config.motion),
            services,
            queue,
            attachment,
            monitor,
            arbiter,
            clock: Arc::new(TokioClock::new()),
            busy: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            cycle: Arc::new(Mutex::new(None)),
            stats: Mutex::new(CycleStats::default()),
            shutdown_tx,
        }
    }

    /// Replace the time source used for deadline arithmetic.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn attachment(&self) -> &AttachmentSignal {
        &self.attachment
    }

    pub fn arbiter(&self) -> &ControllerArbiter {
        &self.arbiter
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Home the robot and start the tick loop.
    pub async fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return;
        }

        info!("Starting intercept orchestrator");
        self.home().await;
        self.spawn_tick_loop();
        info!("Intercept orchestrator started");
    }

    /// Stop the tick loop. A cycle in flight runs to completion.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return;
        }

        info!("Stopping intercept orchestrator");
        let _ = self.shutdown_tx.send(());
    }

    /// Get current orchestrator status.
    pub fn status(&self) -> OrchestratorStatus {
        let cycle = CycleState::from(self.lock_cycle().as_ref());
        let stats = self.lock_stats();

        OrchestratorStatus {
            running: self.is_running(),
            busy: self.is_busy(),
            cycle,
            queue_length: self.queue.len(),
            cycles_completed: stats.completed,
            cycles_aborted: stats.aborted,
            last_outcome: stats.last_outcome.clone(),
        }
    }

    /// Serve the next task, if any and if no cycle is running.
    pub async fn tick(&self) -> TickOutcome {
        if self.queue.is_empty() {
            return TickOutcome::Idle;
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Cycle in progress, skipping tick");
            return TickOutcome::Busy;
        }

        let Some(task) = self.queue.pop() else {
            self.busy.store(false, Ordering::SeqCst);
            return TickOutcome::Idle;
        };

        let report = self.run_cycle(task).await;
        self.record(&report);
        TickOutcome::Ran(report)
    }

    /// Spawn the periodic tick task.
    fn spawn_tick_loop(self: &Arc<Self>) {
        let orchestrator = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let period = self.config.tick_interval();

        tokio::spawn(async move {
            info!("Tick loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Tick loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(period) => {
                        if !orchestrator.is_running() {
                            break;
                        }
                        orchestrator.tick().await;
                    }
                }
            }
            info!("Tick loop stopped");
        });
    }

    /// Release the gripper and park the transport group.
    async fn home(&self) {
        release_gripper(&self.services).await;
        if !move_to_safe_pose(&self.services, &self.arbiter, &self.robot.transport, true).await {
            warn!("Startup homing did not reach the safe pose");
        }
        self.arbiter.deactivate_all().await;
    }

    async fn run_cycle(&self, task: TargetTask) -> CycleReport {
        let started = Instant::now();
        let proceed = ProceedFlag::new();
        info!(task_id = %task.id, "Starting cycle");

        *self.lock_cycle() = Some(ActiveCycle {
            task_id: task.id,
            segment: SegmentKind::Approach,
            proceed: proceed.clone(),
        });

        let guard = ExecutionGuard::new(
            GuardContext {
                services: self.services.clone(),
                arbiter: Arc::clone(&self.arbiter),
                monitor: Arc::clone(&self.monitor),
                transport: self.robot.transport.clone(),
                busy: Arc::clone(&self.busy),
                cycle: Arc::clone(&self.cycle),
                settle: self.config.safe_return_settle(),
            },
            proceed.clone(),
        );

        let mut progress = CycleProgress::default();
        let outcome = self.run_pipeline(&task, &proceed, &mut progress).await;

        if let Err(e) = &outcome {
            proceed.clear();
            error!(task_id = %task.id, error = %e, "Cycle aborted");
        }

        self.enter(SegmentKind::Return);
        let safe_pose_reached = guard.release().await;

        let report = CycleReport {
            task_id: task.id,
            outcome,
            segments_executed: progress.segments_executed,
            pick_wait: progress.pick_wait,
            warnings: progress.warnings,
            safe_pose_reached,
            duration: started.elapsed(),
        };
        info!(
            task_id = %task.id,
            outcome = report.outcome_label(),
            duration_ms = report.duration.as_millis() as u64,
            "Cycle finished"
        );
        report
    }

    async fn run_pipeline(
        &self,
        task: &TargetTask,
        proceed: &ProceedFlag,
        progress: &mut CycleProgress,
    ) -> Result<(), OrchestratorError> {
        self.reset().await;

        let angle = self.robot.preferred_grasp_angle;
        let yaw_tolerance = self.motion.yaw_tolerance;

        // Approach
        self.enter(SegmentKind::Approach);
        let approach = self
            .plan_segment(
                SegmentKind::Approach,
                GroupRole::Transport,
                &task.poses.approach.rotated_about_z(angle),
                yaw_tolerance,
            )
            .await?;
        self.execute_segment(GroupRole::Transport, &approach, progress)
            .await?;

        // Pick
        self.enter(SegmentKind::Pick);
        let pick = self
            .plan_segment(
                SegmentKind::Pick,
                GroupRole::Manipulator,
                &task.poses.pick.rotated_about_z(angle),
                yaw_tolerance,
            )
            .await?;

        let wait = DeadlineScheduler::gate(self.clock.now(), task.pick_deadline(), pick.duration())
            .map_err(|miss| OrchestratorError::DeadlineMiss {
                late_by: miss.late_by,
            })?;
        progress.pick_wait = Some(wait);
        DEADLINE_SLACK.observe(wait.as_secs_f64());
        info!(wait_ms = wait.as_millis() as u64, "Deadline gate passed");
        tokio::time::sleep(wait).await;

        self.set_gripper(true).await?;
        self.monitor
            .start(
                MonitorMode::StopOnAttach {
                    group: self.robot.manipulator.group.clone(),
                },
                self.config.attach_monitor_interval(),
            )
            .await;
        self.execute_segment(GroupRole::Manipulator, &pick, progress)
            .await?;
        self.monitor.stop().await;

        let timeout = self.config.grasp_timeout();
        if !self
            .attachment
            .wait_until_attached(timeout, self.config.attach_poll_interval())
            .await
        {
            return Err(OrchestratorError::GraspTimeout { waited: timeout });
        }
        info!("Object attached");

        self.monitor
            .start(
                MonitorMode::StopOnDetach {
                    groups: vec![
                        self.robot.transport.group.clone(),
                        self.robot.manipulator.group.clone(),
                    ],
                    proceed: proceed.clone(),
                },
                self.config.detach_monitor_interval(),
            )
            .await;

        // Retreat
        self.enter(SegmentKind::Retreat);
        ensure_proceed(proceed)?;
        let retreat = self
            .plan_segment(
                SegmentKind::Retreat,
                GroupRole::Manipulator,
                &task.poses.retreat.rotated_about_z(angle),
                yaw_tolerance,
            )
            .await?;
        ensure_proceed(proceed)?;
        self.execute_segment(GroupRole::Manipulator, &retreat, progress)
            .await?;

        // Place
        self.enter(SegmentKind::Place);
        ensure_proceed(proceed)?;
        let place = self
            .plan_segment(
                SegmentKind::Place,
                GroupRole::Transport,
                &task.poses.place.rotated_about_z(angle + PI),
                self.motion.place_yaw_tolerance,
            )
            .await?;
        ensure_proceed(proceed)?;
        self.execute_segment(GroupRole::Transport, &place, progress)
            .await?;
        self.monitor.stop().await;
        ensure_proceed(proceed)?;

        self.set_gripper(false).await?;
        Ok(())
    }

    /// Put the robot in a known state before a cycle.
    async fn reset(&self) {
        self.arbiter.deactivate_all().await;
        release_gripper(&self.services).await;
        for group in [&self.robot.transport.group, &self.robot.manipulator.group] {
            if let Err(e) = self.services.executor.stop(group).await {
                warn!(group = %group, error = %e, "Failed to stop group during reset");
            }
        }
    }

    async fn plan_segment(
        &self,
        kind: SegmentKind,
        role: GroupRole,
        pose: &StampedPose,
        yaw_tolerance: f64,
    ) -> Result<MotionSegment, OrchestratorError> {
        let group = self.robot.group(role);
        let goal = self.builder.build(pose, &group.group, yaw_tolerance)?;

        let start_state = self
            .services
            .executor
            .current_state(&group.group)
            .await
            .map_err(|e| OrchestratorError::PlanningFailure {
                segment: kind,
                reason: format!("start state unavailable: {}", e),
            })?;

        let request = MotionPlanRequest {
            group: group.group.clone(),
            start_state,
            goal,
            allowed_planning_time_secs: self.motion.allowed_planning_time_secs,
            num_planning_attempts: self.motion.planning_attempts,
            planner_id: self.motion.planner_id.clone(),
        };

        let mut trajectory = self.services.planner.plan(request).await.map_err(|e| {
            OrchestratorError::PlanningFailure {
                segment: kind,
                reason: e.to_string(),
            }
        })?;
        if trajectory.is_empty() {
            return Err(OrchestratorError::PlanningFailure {
                segment: kind,
                reason: "empty trajectory".to_string(),
            });
        }
        trajectory.curate();

        let segment = MotionSegment {
            kind,
            group: group.clone(),
            trajectory,
        };
        info!(
            segment = %kind,
            group = %group.group,
            duration_ms = segment.duration().as_millis() as u64,
            "Planned segment"
        );
        Ok(segment)
    }

    /// Hand the controller slot to `role`, run the trajectory and release
    /// the controller again. Non-fatal failures end up in `progress`.
    async fn execute_segment(
        &self,
        role: GroupRole,
        segment: &MotionSegment,
        progress: &mut CycleProgress,
    ) -> Result<(), OrchestratorError> {
        let controller = self.arbiter.controller(role);
        if !self.arbiter.handover(role).await {
            progress.tolerate(OrchestratorError::ControllerSwitchFailure {
                controller: controller.to_string(),
                action: "activate".to_string(),
            })?;
        }

        let request = ExecutionRequest::new(segment.group.group.clone(), segment.trajectory.clone());
        progress.segments_executed.push(segment.kind);
        let segment_label = segment.kind.as_str();

        let outcome = match self.services.executor.execute(request).await {
            Ok(()) => {
                SEGMENT_EXECUTIONS
                    .with_label_values(&[segment_label, "success"])
                    .inc();
                info!(segment = %segment.kind, "Segment executed");
                Ok(())
            }
            Err(e) if e.is_preempted() => {
                SEGMENT_EXECUTIONS
                    .with_label_values(&[segment_label, "preempted"])
                    .inc();
                info!(segment = %segment.kind, "Segment stopped early");
                Ok(())
            }
            Err(e) => {
                SEGMENT_EXECUTIONS
                    .with_label_values(&[segment_label, "error"])
                    .inc();
                warn!(segment = %segment.kind, error = %e, "Segment execution failed");
                Err(OrchestratorError::ExecutionFailure {
                    segment: segment.kind,
                    reason: e.to_string(),
                })
            }
        };

        if !self.arbiter.deactivate(controller).await {
            progress.tolerate(OrchestratorError::ControllerSwitchFailure {
                controller: controller.to_string(),
                action: "deactivate".to_string(),
            })?;
        }

        match outcome {
            Ok(()) => Ok(()),
            Err(e) => progress.tolerate(e),
        }
    }

    async fn set_gripper(&self, enable: bool) -> Result<(), OrchestratorError> {
        match self.services.gripper.set_enabled(enable).await {
            Ok(true) => {
                debug!(enable, "Gripper switched");
                Ok(())
            }
            Ok(false) => Err(OrchestratorError::GripperFailure { enable }),
            Err(e) => {
                warn!(enable, error = %e, "Gripper request failed");
                Err(OrchestratorError::GripperFailure { enable })
            }
        }
    }

    fn enter(&self, segment: SegmentKind) {
        if let Some(cycle) = self.lock_cycle().as_mut() {
            cycle.segment = segment;
        }
    }

    fn record(&self, report: &CycleReport) {
        let label = report.outcome_label();
        CYCLES_TOTAL.with_label_values(&[label]).inc();
        CYCLE_DURATION
            .with_label_values(&[label])
            .observe(report.duration.as_secs_f64());

        let mut stats = self.lock_stats();
        if report.is_success() {
            stats.completed += 1;
        } else {
            stats.aborted += 1;
        }
        stats.last_outcome = Some(label.to_string());
    }

    fn lock_cycle(&self) -> MutexGuard<'_, Option<ActiveCycle>> {
        self.cycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_stats(&self) -> MutexGuard<'_, CycleStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ensure_proceed(proceed: &ProceedFlag) -> Result<(), OrchestratorError> {
    if proceed.is_set() {
        Ok(())
    } else {
        Err(OrchestratorError::GraspLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockControllerSwitcher, MockExecutor, MockGripper, MockPlanner};

    fn orchestrator() -> InterceptOrchestrator {
        let services = RobotServices {
            planner: Arc::new(MockPlanner::new()),
            executor: Arc::new(MockExecutor::new()),
            controllers: Arc::new(MockControllerSwitcher::new()),
            gripper: Arc::new(MockGripper::new()),
        };
        InterceptOrchestrator::new(
            &Config::default(),
            services,
            TaskQueue::new(),
            AttachmentSignal::new(),
        )
    }

    #[test]
    fn test_ensure_proceed() {
        let proceed = ProceedFlag::new();
        assert!(ensure_proceed(&proceed).is_ok());
        proceed.clear();
        assert!(matches!(
            ensure_proceed(&proceed),
            Err(OrchestratorError::GraspLost)
        ));
    }

    #[test]
    fn test_progress_keeps_only_non_fatal_errors() {
        let mut progress = CycleProgress::default();
        assert!(progress
            .tolerate(OrchestratorError::ExecutionFailure {
                segment: SegmentKind::Place,
                reason: "aborted".to_string(),
            })
            .is_ok());
        assert!(progress
            .tolerate(OrchestratorError::ControllerSwitchFailure {
                controller: "robot_controller".to_string(),
                action: "deactivate".to_string(),
            })
            .is_ok());
        assert!(matches!(
            progress.tolerate(OrchestratorError::GraspLost),
            Err(OrchestratorError::GraspLost)
        ));
        assert_eq!(progress.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_tick_is_idle() {
        let orchestrator = orchestrator();
        assert!(matches!(orchestrator.tick().await, TickOutcome::Idle));
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_initial_status() {
        let status = orchestrator().status();
        assert!(!status.running);
        assert!(!status.busy);
        assert_eq!(status.cycle, CycleState::Idle);
        assert_eq!(status.queue_length, 0);
        assert_eq!(status.cycles_completed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_homes_and_stop_halts_loop() {
        let orchestrator = Arc::new(orchestrator());
        orchestrator.start().await;
        assert!(orchestrator.is_running());
        assert!(orchestrator.arbiter().active_controllers().is_empty());

        orchestrator.stop().await;
        assert!(!orchestrator.is_running());
    }
}
