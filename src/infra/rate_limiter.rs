use crate::app::ports::RateLimiterPort;
use std::time::Duration;
use tracing::trace;

/// Fixed post-call delay. A zero interval disables pacing.
#[derive(Debug, Clone)]
pub struct FixedIntervalLimiter {
    interval: Duration,
}

impl FixedIntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl RateLimiterPort for FixedIntervalLimiter {
    fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        trace!(interval_ms = self.interval.as_millis() as u64, "rate limit pause");
        std::thread::sleep(self.interval);
    }
}
