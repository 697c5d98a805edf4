//! Time source for deadline arithmetic.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Supplies the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock driven by tokio's monotonic clock.
///
/// The wall time is sampled once at construction and advanced by
/// `tokio::time::Instant`, so `now()` moves in lockstep with
/// `tokio::time::sleep` (including when tokio time is paused in tests).
#[derive(Debug, Clone)]
pub struct TokioClock {
    wall_origin: DateTime<Utc>,
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            wall_origin: Utc::now(),
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_tokio_time() {
        let clock = TokioClock::new();
        let before = clock.now();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let elapsed = clock.now() - before;
        assert_eq!(elapsed.num_milliseconds(), 1500);
    }
}
