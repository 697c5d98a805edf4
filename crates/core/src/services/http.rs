//! HTTP client for the robot collaborator services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::motion::{ExecutionRequest, JointState, JointTrajectory, MotionPlanRequest};

use super::config::ServicesConfig;
use super::traits::{ControllerSwitcher, GripperControl, MotionPlanner, TrajectoryExecutor};
use super::types::{
    GripperRequest, GripperResponse, MotionCodeResponse, NamedMoveRequest, PlanResponse,
    ServiceError, StopRequest, SwitchControllerRequest, SwitchControllerResponse,
};

/// Talks to a robot service exposing planning, execution, controller
/// switching and the gripper over JSON.
pub struct HttpRobotClient {
    client: Client,
    config: ServicesConfig,
}

impl HttpRobotClient {
    pub fn new(config: ServicesConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url(), endpoint)
    }

    /// Returns true when the service answers its health endpoint.
    pub async fn health(&self) -> bool {
        match self.client.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Robot service health check failed");
                false
            }
        }
    }

    /// Poll the health endpoint until it answers or `timeout` elapses.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), ServiceError> {
        let poll = Duration::from_millis(250);
        let result = tokio::time::timeout(timeout, async {
            loop {
                if self.health().await {
                    return;
                }
                tokio::time::sleep(poll).await;
            }
        })
        .await;

        result.map_err(|_| {
            warn!(url = %self.base_url(), "Robot service did not become ready");
            ServiceError::Timeout
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::ApiError(format!("Invalid response: {}", e)))
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        self.send(self.client.post(self.url(endpoint)).json(body))
            .await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else if e.is_connect() {
        ServiceError::ConnectionFailed(e.to_string())
    } else {
        ServiceError::ApiError(e.to_string())
    }
}

fn check_code(code: i32) -> Result<(), ServiceError> {
    match ServiceError::from_code(code) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[async_trait]
impl MotionPlanner for HttpRobotClient {
    async fn plan(&self, request: MotionPlanRequest) -> Result<JointTrajectory, ServiceError> {
        debug!(group = %request.group, "Requesting motion plan");
        let response: PlanResponse = self.post("/plan", &request).await?;
        check_code(response.error_code)?;
        response
            .trajectory
            .ok_or_else(|| ServiceError::ApiError("Plan response without trajectory".to_string()))
    }
}

#[async_trait]
impl TrajectoryExecutor for HttpRobotClient {
    async fn execute(&self, request: ExecutionRequest) -> Result<(), ServiceError> {
        // The call only returns when motion ends, so it may outlive the
        // default request timeout by the trajectory's length.
        let budget = Duration::from_secs(self.config.timeout_secs) + request.trajectory.duration();
        let builder = self
            .client
            .post(self.url("/execute"))
            .timeout(budget)
            .json(&request);
        let response: MotionCodeResponse = self.send(builder).await?;
        check_code(response.error_code)
    }

    async fn stop(&self, group: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self
            .post(
                "/stop",
                &StopRequest {
                    group: group.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    async fn move_to_named(
        &self,
        group: &str,
        target: &str,
        wait: bool,
    ) -> Result<(), ServiceError> {
        let request = NamedMoveRequest {
            group: group.to_string(),
            target: target.to_string(),
            wait,
        };
        let mut builder = self.client.post(self.url("/move_named")).json(&request);
        if wait {
            builder = builder.timeout(Duration::from_secs(self.config.motion_timeout_secs));
        }
        let response: MotionCodeResponse = self.send(builder).await?;
        check_code(response.error_code)
    }

    async fn current_state(&self, group: &str) -> Result<JointState, ServiceError> {
        self.send(self.client.get(self.url(&format!("/state/{}", group))))
            .await
    }
}

#[async_trait]
impl ControllerSwitcher for HttpRobotClient {
    async fn switch(&self, request: SwitchControllerRequest) -> Result<bool, ServiceError> {
        let response: SwitchControllerResponse = self.post("/switch_controller", &request).await?;
        Ok(response.ok)
    }
}

#[async_trait]
impl GripperControl for HttpRobotClient {
    async fn set_enabled(&self, enable: bool) -> Result<bool, ServiceError> {
        let response: GripperResponse = self.post("/gripper", &GripperRequest { enable }).await?;
        Ok(response.success)
    }
}
