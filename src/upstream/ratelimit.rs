use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Token bucket guarding outbound requests to the primary provider.
///
/// Refill is computed lazily from elapsed wall time at acquisition; there is
/// no background timer. `try_acquire` never blocks.
pub struct RateLimiter {
    capacity: u32,
    refill_interval: Duration,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a bucket holding `capacity` tokens, refilling one token per
    /// `refill_interval` elapsed.
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            capacity,
            refill_interval,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token if available. Returns false when the bucket is empty.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        let refill = (elapsed.as_millis() / self.refill_interval.as_millis().max(1)) as u32;

        if refill > 0 {
            state.tokens = self.capacity.min(state.tokens.saturating_add(refill));
            state.last_refill = now;
        }

        if state.tokens > 0 {
            state.tokens -= 1;
            true
        } else {
            false
        }
    }
}
