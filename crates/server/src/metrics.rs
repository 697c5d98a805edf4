//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the interceptor server:
//! - HTTP request metrics (latency, counts)
//! - Orchestrator state (collected dynamically)
//! - The core's cycle, segment and queue metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::error;
use uuid::Uuid;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "interceptor_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("interceptor_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "interceptor_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Orchestrator Metrics (collected dynamically)
// =============================================================================

/// Orchestrator running state (1 = running, 0 = stopped).
pub static ORCHESTRATOR_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "interceptor_orchestrator_running",
        "Whether the orchestrator is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Cycle in flight (1 = busy, 0 = idle).
pub static ORCHESTRATOR_BUSY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "interceptor_orchestrator_busy",
        "Whether a pick-and-place cycle is in flight",
    )
    .unwrap()
});

/// Attachment sensor reading (1 = attached).
pub static ATTACHMENT_STATE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "interceptor_attachment_state",
        "Latest attachment sensor reading (1 = attached)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // Orchestrator
        Box::new(ORCHESTRATOR_RUNNING.clone()),
        Box::new(ORCHESTRATOR_BUSY.clone()),
        Box::new(ATTACHMENT_STATE.clone()),
    ];

    // Core metrics (queue, cycles, segments, controllers)
    let core_metrics = interceptor_core::metrics::all_metrics();

    for metric in server_metrics.into_iter().chain(core_metrics) {
        if let Err(e) = registry.register(metric) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current values
/// from the orchestrator and the attachment sensor.
pub fn collect_dynamic_metrics(state: &AppState) {
    let orchestrator = state.orchestrator();
    ORCHESTRATOR_RUNNING.set(orchestrator.is_running() as i64);
    ORCHESTRATOR_BUSY.set(orchestrator.is_busy() as i64);
    ATTACHMENT_STATE.set(state.attachment().is_attached() as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
            if numeric || Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/tasks/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/tasks/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/v1/tasks/12345/poses/2";
        assert_eq!(normalize_path(path), "/api/v1/tasks/{id}/poses/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/tasks/"), "/api/v1/tasks/");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("interceptor_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        ORCHESTRATOR_RUNNING.set(0);
        ORCHESTRATOR_BUSY.set(0);
        interceptor_core::metrics::TASK_QUEUE_DEPTH.set(0);
        interceptor_core::metrics::CYCLES_TOTAL
            .with_label_values(&["success"])
            .inc_by(0);

        let output = encode_metrics();

        assert!(output.contains("interceptor_http_requests_in_flight"));
        assert!(output.contains("interceptor_orchestrator_running"));
        assert!(output.contains("interceptor_orchestrator_busy"));
        assert!(output.contains("interceptor_task_queue_depth"));
        assert!(output.contains("interceptor_cycles_total"));
    }
}
