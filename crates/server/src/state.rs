use std::sync::Arc;

use interceptor_core::{AttachmentSignal, Config, InterceptOrchestrator, TaskQueue};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<InterceptOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<InterceptOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<InterceptOrchestrator> {
        &self.orchestrator
    }

    /// Queue fed by the task ingestion endpoint.
    pub fn queue(&self) -> &TaskQueue {
        self.orchestrator.queue()
    }

    pub fn attachment(&self) -> &AttachmentSignal {
        self.orchestrator.attachment()
    }
}
