//! Proactive request pacing for ESI.
//!
//! ESI publishes no per-second quota; what it enforces is the error budget.
//! Pacing is still useful against a struggling ESI, where a round of
//! concurrent requests that all fail at once can spend the budget in a single
//! burst. The limiter allows no burst: requests leave at evenly spaced
//! instants, so a round of N lookups is spread over N intervals.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Evenly spaced pacing shared by every clone of an [`EsiClient`](super::EsiClient).
///
/// Independent of the [`ErrorBudget`](super::ErrorBudget), which only reacts
/// once errors have happened.
#[derive(Clone)]
pub struct ApiRateLimiter {
    limiter: Arc<DirectLimiter>,
    requests_per_second: NonZeroU32,
}

impl ApiRateLimiter {
    /// Pace requests to at most `requests_per_second`, one at a time.
    ///
    /// Zero is raised to one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let requests_per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(requests_per_second).allow_burst(NonZeroU32::MIN);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            requests_per_second,
        }
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second.get()
    }

    /// Wait for the next request slot.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .finish_non_exhaustive()
    }
}
