//! Intercept tasks and the pending-task queue.

mod queue;
mod types;

pub use queue::TaskQueue;
pub use types::{TargetPoses, TargetTask};
