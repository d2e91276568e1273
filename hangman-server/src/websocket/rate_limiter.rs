use std::time::{Duration, Instant};

const BURST: u32 = 20;
const REFILL_INTERVAL: Duration = Duration::from_millis(500);

/// Per-connection token bucket. One token per inbound frame, refilled on a
/// fixed interval so a client can burst but not flood.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    capacity: u32,
    available: u32,
    refill_interval: Duration,
    refilled_at: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(BURST, REFILL_INTERVAL)
    }

    pub fn with_limits(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            capacity,
            available: capacity,
            refill_interval,
            refilled_at: Instant::now(),
        }
    }

    /// Consumes a token if one is available. Returns false when the
    /// connection should be throttled.
    pub fn try_acquire(&mut self) -> bool {
        self.refill(Instant::now());
        if self.available > 0 {
            self.available -= 1;
            true
        } else {
            false
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.refilled_at);
        let intervals = (elapsed.as_millis() / self.refill_interval.as_millis()) as u32;
        if intervals > 0 {
            self.available = (self.available + intervals).min(self.capacity);
            // Advance by whole intervals only, so partial progress toward
            // the next token is not lost.
            self.refilled_at += self.refill_interval * intervals;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_drains_the_bucket() {
        let mut limiter = RateLimiter::with_limits(3, Duration::from_secs(60));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn tokens_come_back_after_the_interval() {
        let mut limiter = RateLimiter::with_limits(1, Duration::from_millis(5));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        std::thread::sleep(Duration::from_millis(10));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let mut limiter = RateLimiter::with_limits(2, Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
