use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Last reported value of the end-effector attachment sensor.
///
/// Written only by the sensor input; the orchestrator and the monitor read
/// it. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSignal {
    attached: Arc<AtomicBool>,
}

impl AttachmentSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sensor reading. Returns the previous value.
    pub fn set(&self, attached: bool) -> bool {
        let previous = self.attached.swap(attached, Ordering::SeqCst);
        if previous != attached {
            debug!(attached, "Attachment signal changed");
        }
        previous
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Poll every `poll` until the signal reads true or `timeout` elapses.
    /// Returns whether attachment was observed.
    pub async fn wait_until_attached(&self, timeout: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_attached() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(poll.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let sensor = AttachmentSignal::new();
        let reader = sensor.clone();
        assert!(!reader.is_attached());
        assert!(!sensor.set(true));
        assert!(reader.is_attached());
        assert!(sensor.set(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_when_attached() {
        let signal = AttachmentSignal::new();
        let writer = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            writer.set(true);
        });

        let start = Instant::now();
        let attached = signal
            .wait_until_attached(Duration::from_secs(2), Duration::from_millis(10))
            .await;
        assert!(attached);
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let signal = AttachmentSignal::new();
        let start = Instant::now();
        let attached = signal
            .wait_until_attached(Duration::from_secs(2), Duration::from_millis(10))
            .await;
        assert!(!attached);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2));
        assert!(waited < Duration::from_millis(2050));
    }
}
