//! Task ingestion handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use interceptor_core::{TargetPoses, TargetTask};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for an accepted task
#[derive(Debug, Serialize)]
pub struct TaskAcceptedResponse {
    pub id: Uuid,
    /// Queue length including the new task
    pub queue_length: usize,
}

/// Queue summary
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub queue_length: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TaskErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Enqueue a target for interception.
///
/// The body carries the four stamped poses; the stamps are absolute times
/// at which the object will be at each pose.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(poses): Json<TargetPoses>,
) -> Result<(StatusCode, Json<TaskAcceptedResponse>), impl IntoResponse> {
    if let Some(name) = poses.invalid_pose() {
        warn!(pose = name, "Rejected target with invalid pose");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(TaskErrorResponse {
                error: format!("Invalid {} pose", name),
            }),
        ));
    }

    let task = TargetTask::new(poses);
    let id = task.id;
    let queue_length = state.queue().push(task);

    Ok((
        StatusCode::ACCEPTED,
        Json(TaskAcceptedResponse { id, queue_length }),
    ))
}

/// Get the number of pending tasks
pub async fn get_queue(State(state): State<Arc<AppState>>) -> Json<QueueResponse> {
    Json(QueueResponse {
        queue_length: state.queue().len(),
    })
}
