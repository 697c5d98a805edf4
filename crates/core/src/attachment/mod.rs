//! Attachment sensing: the shared sensor value and the periodic monitor
//! that halts motion when it changes.

mod monitor;
mod signal;

pub use monitor::{AttachmentMonitor, MonitorMode};
pub use signal::AttachmentSignal;
