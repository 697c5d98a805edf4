//! Intercept deadline arithmetic.
//!
//! A moving object reaches the grasp point at a known reference time. The
//! pick trajectory must finish no later than that instant; the remaining
//! slack is spent waiting before the grasp is released.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome of a failed deadline check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineMiss {
    /// How far past the reference time the motion would finish.
    pub late_by: Duration,
}

/// Pure deadline functions.
pub struct DeadlineScheduler;

impl DeadlineScheduler {
    /// True iff a motion of `planned` started at `now` ends at or before
    /// `reference`.
    pub fn can_intercept(now: DateTime<Utc>, reference: DateTime<Utc>, planned: Duration) -> bool {
        match Self::finish_time(now, planned) {
            Some(finish) => finish <= reference,
            None => false,
        }
    }

    /// Interval to wait before starting a motion of `planned` so that it
    /// ends exactly at `reference`. Zero if the deadline cannot be met.
    pub fn wait_before(now: DateTime<Utc>, reference: DateTime<Utc>, planned: Duration) -> Duration {
        let remaining = (reference - now).to_std().unwrap_or_default();
        remaining.saturating_sub(planned)
    }

    /// Combined check: the wait interval, or by how much the deadline is
    /// missed.
    pub fn gate(
        now: DateTime<Utc>,
        reference: DateTime<Utc>,
        planned: Duration,
    ) -> Result<Duration, DeadlineMiss> {
        if Self::can_intercept(now, reference, planned) {
            return Ok(Self::wait_before(now, reference, planned));
        }

        let late_by = match Self::finish_time(now, planned) {
            Some(finish) => (finish - reference).to_std().unwrap_or_default(),
            None => Duration::MAX,
        };
        Err(DeadlineMiss { late_by })
    }

    fn finish_time(now: DateTime<Utc>, planned: Duration) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(planned)
            .ok()
            .and_then(|planned| now.checked_add_signed(planned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_can_intercept_matches_definition() {
        let samples = [0i64, 1, 499, 500, 501, 1999, 2000, 2001, 5000];
        for &now in &samples {
            for &reference in &samples {
                for &planned in &samples {
                    let expected = now + planned <= reference;
                    assert_eq!(
                        DeadlineScheduler::can_intercept(
                            t(now),
                            t(reference),
                            Duration::from_millis(planned as u64)
                        ),
                        expected,
                        "now={} reference={} planned={}",
                        now,
                        reference,
                        planned
                    );
                }
            }
        }
    }

    #[test]
    fn test_exact_deadline_is_reachable() {
        assert!(DeadlineScheduler::can_intercept(
            t(0),
            t(2000),
            Duration::from_secs(2)
        ));
        assert_eq!(
            DeadlineScheduler::wait_before(t(0), t(2000), Duration::from_secs(2)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_gate_returns_wait() {
        let wait = DeadlineScheduler::gate(t(0), t(5000), Duration::from_secs(2)).unwrap();
        assert_eq!(wait, Duration::from_secs(3));
    }

    #[test]
    fn test_gate_reports_miss() {
        let miss = DeadlineScheduler::gate(t(0), t(2000), Duration::from_millis(2500)).unwrap_err();
        assert_eq!(miss.late_by, Duration::from_millis(500));
    }

    #[test]
    fn test_reference_in_the_past() {
        assert!(!DeadlineScheduler::can_intercept(t(1000), t(0), Duration::ZERO));
        assert_eq!(
            DeadlineScheduler::wait_before(t(1000), t(0), Duration::ZERO),
            Duration::ZERO
        );
        let miss = DeadlineScheduler::gate(t(1000), t(0), Duration::from_millis(250)).unwrap_err();
        assert_eq!(miss.late_by, Duration::from_millis(1250));
    }
}
