//! Per-request progress accounting for long-running feed generation.
//!
//! One tracker per streaming response; nothing here is shared across
//! requests. Uses `Instant` throughout — wall-clock jumps (NTP, VM
//! resume) must not distort rate limiting or ETAs.

use std::time::{Duration, Instant};

/// Mutable counters scoped to a single feed generation pass.
#[derive(Debug)]
pub struct FeedProgress {
    processed: usize,
    total: usize,
    started: Instant,
    last_log: Instant,
    log_interval: Duration,
}

/// Point-in-time view of a [`FeedProgress`], with linear extrapolations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub elapsed: Duration,
    /// Linear estimate of the whole pass; `None` until the first
    /// increment (the extrapolation is undefined at zero progress).
    pub estimated_total: Option<Duration>,
    pub estimated_remaining: Option<Duration>,
}

impl FeedProgress {
    pub fn new(total: usize, log_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            processed: 0,
            total,
            started: now,
            // Backdate so the first should_log() fires immediately
            last_log: now.checked_sub(log_interval).unwrap_or(now),
            log_interval,
        }
    }

    /// Record `n` more processed products.
    pub fn increment(&mut self, n: usize) {
        self.processed = self.processed.saturating_add(n);
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// True at most once per log interval. Side effect: advances the
    /// internal last-log instant when it returns true.
    pub fn should_log(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_log) >= self.log_interval {
            self.last_log = now;
            true
        } else {
            false
        }
    }

    /// Current counts plus linear ETA estimates.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed = self.started.elapsed();
        let (estimated_total, estimated_remaining) = if self.processed == 0 {
            (None, None)
        } else {
            let fraction = self.processed as f64 / self.total.max(1) as f64;
            let total_est = elapsed.div_f64(fraction.min(1.0).max(f64::EPSILON));
            let remaining = total_est.saturating_sub(elapsed);
            (Some(total_est), Some(remaining))
        };

        ProgressSnapshot {
            processed: self.processed,
            total: self.total,
            elapsed,
            estimated_total,
            estimated_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_accumulates() {
        let mut p = FeedProgress::new(100, Duration::from_millis(10));
        p.increment(30);
        p.increment(20);
        assert_eq!(p.processed(), 50);
        assert_eq!(p.total(), 100);
    }

    #[test]
    fn test_estimates_none_before_first_increment() {
        let p = FeedProgress::new(100, Duration::from_secs(5));
        let snap = p.snapshot();
        assert_eq!(snap.processed, 0);
        assert!(snap.estimated_total.is_none());
        assert!(snap.estimated_remaining.is_none());
    }

    #[test]
    fn test_estimates_present_after_increment() {
        let mut p = FeedProgress::new(100, Duration::from_secs(5));
        p.increment(50);
        std::thread::sleep(Duration::from_millis(5));
        let snap = p.snapshot();
        let total_est = snap.estimated_total.expect("estimate after progress");
        // Half done: the estimate is roughly twice elapsed, never less
        // than elapsed itself.
        assert!(total_est >= snap.elapsed);
        assert!(snap.estimated_remaining.unwrap() <= total_est);
    }

    #[test]
    fn test_complete_pass_has_no_remaining_time() {
        let mut p = FeedProgress::new(10, Duration::from_secs(5));
        p.increment(10);
        let snap = p.snapshot();
        assert_eq!(snap.estimated_remaining, Some(Duration::ZERO));
    }

    #[test]
    fn test_zero_total_does_not_panic() {
        let mut p = FeedProgress::new(0, Duration::from_secs(5));
        p.increment(1);
        let snap = p.snapshot();
        assert!(snap.estimated_total.is_some());
    }

    #[test]
    fn test_should_log_fires_immediately_then_rate_limits() {
        let mut p = FeedProgress::new(100, Duration::from_secs(60));
        assert!(p.should_log());
        // Within the interval: suppressed
        assert!(!p.should_log());
        assert!(!p.should_log());
    }

    #[test]
    fn test_should_log_fires_again_after_interval() {
        let mut p = FeedProgress::new(100, Duration::from_millis(5));
        assert!(p.should_log());
        std::thread::sleep(Duration::from_millis(10));
        assert!(p.should_log());
    }
}
