//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Task ingestion (received tasks, queue depth)
//! - Orchestration cycles (outcomes, durations, deadline slack)
//! - Segment execution and controller switching

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Task Metrics
// =============================================================================

/// Tasks accepted into the queue.
pub static TASKS_RECEIVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "interceptor_tasks_received_total",
        "Total intercept tasks received",
    )
    .unwrap()
});

/// Tasks waiting in the queue.
pub static TASK_QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "interceptor_task_queue_depth",
        "Number of intercept tasks waiting to be served",
    )
    .unwrap()
});

// =============================================================================
// Cycle Metrics
// =============================================================================

/// Finished cycles by outcome.
pub static CYCLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("interceptor_cycles_total", "Total orchestration cycles"),
        &["outcome"], // "success", "deadline_miss", "grasp_timeout", ...
    )
    .unwrap()
});

/// Cycle duration from dequeue to idle.
pub static CYCLE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "interceptor_cycle_duration_seconds",
            "Duration of one orchestration cycle",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Wait before the pick motion when the deadline gate passed.
pub static DEADLINE_SLACK: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "interceptor_deadline_slack_seconds",
            "Slack between the planned pick finish and the object arrival",
        )
        .buckets(vec![0.0, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0]),
    )
    .unwrap()
});

// =============================================================================
// Motion Metrics
// =============================================================================

/// Segment executions by result.
pub static SEGMENT_EXECUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "interceptor_segment_executions_total",
            "Total trajectory executions per segment",
        ),
        &["segment", "result"], // result: "success", "error"
    )
    .unwrap()
});

/// Controller switch requests that did not take effect.
pub static CONTROLLER_SWITCH_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "interceptor_controller_switch_failures_total",
            "Controller switch requests that failed",
        ),
        &["action"], // "activate", "deactivate"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TASKS_RECEIVED.clone()),
        Box::new(TASK_QUEUE_DEPTH.clone()),
        Box::new(CYCLES_TOTAL.clone()),
        Box::new(CYCLE_DURATION.clone()),
        Box::new(DEADLINE_SLACK.clone()),
        Box::new(SEGMENT_EXECUTIONS.clone()),
        Box::new(CONTROLLER_SWITCH_FAILURES.clone()),
    ]
}
