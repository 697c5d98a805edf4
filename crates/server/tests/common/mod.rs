//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by an orchestrator wired to the mock robot, so the whole HTTP
//! surface can be exercised without motion services.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use interceptor_core::{
    testing::MockRobot, AttachmentSignal, Clock, Config, InterceptOrchestrator, TaskQueue,
    TokioClock,
};
use interceptor_server::api::create_router;
use interceptor_server::state::AppState;

/// Re-export fixtures for test convenience
pub use interceptor_core::testing::fixtures;

pub const TRANSPORT: &str = "robot_rail";
pub const MANIPULATOR: &str = "robot";

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_queue_starts_empty() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.get("/api/v1/tasks").await;
///
///     assert_eq!(response.body["queue_length"], 0);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock robot - configure durations and failures
    pub robot: MockRobot,
    pub orchestrator: Arc<InterceptOrchestrator>,
    /// Clock shared with the orchestrator
    pub clock: Arc<TokioClock>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture with a custom configuration.
    ///
    /// Segments take half a second on both groups and the gripper clears
    /// the attachment sensor on release.
    pub fn with_config(config: Config) -> Self {
        let robot = MockRobot::new();
        robot.planner.set_duration(TRANSPORT, 0.5);
        robot.planner.set_duration(MANIPULATOR, 0.5);

        let attachment = AttachmentSignal::new();
        robot.gripper.link_sensor(attachment.clone());
        let clock = Arc::new(TokioClock::new());

        let orchestrator = Arc::new(
            InterceptOrchestrator::new(&config, robot.services(), TaskQueue::new(), attachment)
                .with_clock(clock.clone()),
        );

        let state = Arc::new(AppState::new(config, Arc::clone(&orchestrator)));
        let router = create_router(state);

        Self {
            router,
            robot,
            orchestrator,
            clock,
        }
    }

    /// Current time on the orchestrator's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// JSON body for a task whose object reaches the pick point `secs` from now.
    pub fn task_body(&self, secs: f64) -> Value {
        let pick_at = self.now() + chrono::Duration::milliseconds((secs * 1000.0) as i64);
        serde_json::to_value(fixtures::target_task(pick_at).poses)
            .expect("Failed to serialize poses")
    }

    /// Make a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request without a body.
    pub async fn post_empty(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Fetch a plain-text endpoint.
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }
}
