pub mod arbiter;
pub mod attachment;
pub mod clock;
pub mod config;
pub mod deadline;
pub mod geometry;
pub mod metrics;
pub mod motion;
pub mod orchestrator;
pub mod services;
pub mod task;
pub mod testing;

pub use arbiter::ControllerArbiter;
pub use attachment::{AttachmentMonitor, AttachmentSignal, MonitorMode};
pub use clock::{Clock, TokioClock};
pub use config::{
    load_config, load_config_from_str, validate_config, ActuationGroupInfo, Config, ConfigError,
    GroupRole, RobotConfig, ServerConfig,
};
pub use deadline::{DeadlineMiss, DeadlineScheduler};
pub use geometry::{Orientation, Pose, Position, StampedPose};
pub use motion::{MotionConfig, MotionError, MotionRequestBuilder, SegmentKind};
pub use orchestrator::{
    CycleReport, CycleState, InterceptOrchestrator, OrchestratorConfig, OrchestratorError,
    OrchestratorStatus, ProceedFlag, TickOutcome,
};
pub use services::{HttpRobotClient, RobotServices, ServiceError, ServicesConfig};
pub use task::{TargetPoses, TargetTask, TaskQueue};
