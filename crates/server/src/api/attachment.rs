//! Attachment sensor handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::state::AppState;

/// Sensor reading, as posted and as reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttachmentBody {
    pub attached: bool,
}

/// Record the latest sensor reading
pub async fn set_attachment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AttachmentBody>,
) -> Json<AttachmentBody> {
    let previous = state.attachment().set(body.attached);
    if previous != body.attached {
        debug!(attached = body.attached, "Attachment changed");
    }
    Json(body)
}

/// Get the latest sensor reading
pub async fn get_attachment(State(state): State<Arc<AppState>>) -> Json<AttachmentBody> {
    Json(AttachmentBody {
        attached: state.attachment().is_attached(),
    })
}
