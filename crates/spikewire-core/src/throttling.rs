use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared request budget for one provider. Clones draw from the same budget, so
/// every concurrent ticker task is throttled together.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}

impl RequestThrottle {
    /// `requests_per_second` below 1 is treated as 1.
    pub fn per_second(requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// Waits until a request slot is free.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Takes a slot if one is free right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_bounded_by_rate() {
        let throttle = RequestThrottle::per_second(2);
        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[test]
    fn clones_share_budget() {
        let throttle = RequestThrottle::per_second(1);
        let clone = throttle.clone();
        assert!(throttle.try_acquire());
        assert!(!clone.try_acquire());
    }

    #[tokio::test]
    async fn acquire_completes_when_budget_is_available() {
        RequestThrottle::per_second(5).acquire().await;
    }
}
