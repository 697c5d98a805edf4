//! Orchestrator API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use interceptor_core::OrchestratorStatus;

use crate::state::AppState;

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Get orchestrator status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status())
}

/// Start the orchestrator
///
/// Homes the robot before the first tick, so this returns once the
/// transport group has reached its safe pose.
pub async fn start(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let orchestrator = state.orchestrator();
    let message = if orchestrator.is_running() {
        "Orchestrator already running"
    } else {
        orchestrator.start().await;
        "Orchestrator started"
    };
    Json(MessageResponse {
        message: message.to_string(),
    })
}

/// Stop the orchestrator
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let orchestrator = state.orchestrator();
    let message = if orchestrator.is_running() {
        orchestrator.stop().await;
        "Orchestrator stopped"
    } else {
        "Orchestrator not running"
    };
    Json(MessageResponse {
        message: message.to_string(),
    })
}
