//! The ESI error budget.
//!
//! ESI allows a fixed number of error responses per window and reports what is
//! left through the `x-esi-error-limit-remain` / `x-esi-error-limit-reset`
//! headers. Exceeding it gets the client temporarily banned, so every request
//! passes through [`ErrorBudget::before_request`] and every response through
//! [`ErrorBudget::after_response`].
//!
//! The counters are shared between all in-flight requests without a lock.
//! Concurrent read-modify-write sequences may interleave and lose a local
//! decrement; the next response carrying headers corrects it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::http::HttpHeaders;

/// Below this many remaining errors, requests wait out the reset window.
pub const LOW_WATERMARK: u32 = 10;

/// Remaining errors assumed before the first response.
pub const DEFAULT_REMAINING: u32 = 100;

/// Reset window assumed before the first response, in seconds.
pub const DEFAULT_RESET_SECONDS: u32 = 60;

/// Header carrying the remaining error count.
pub const ERROR_LIMIT_REMAIN_HEADER: &str = "x-esi-error-limit-remain";

/// Header carrying the seconds until the error window resets.
pub const ERROR_LIMIT_RESET_HEADER: &str = "x-esi-error-limit-reset";

/// Point-in-time copy of the budget counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSnapshot {
    pub remaining: u32,
    pub reset_seconds: u32,
}

#[derive(Debug)]
struct BudgetState {
    remaining: AtomicU32,
    reset_seconds: AtomicU32,
}

/// Shared error budget. Clones observe and mutate the same counters.
#[derive(Debug, Clone)]
pub struct ErrorBudget {
    state: Arc<BudgetState>,
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self::new(DEFAULT_REMAINING, DEFAULT_RESET_SECONDS)
    }
}

impl ErrorBudget {
    pub fn new(remaining: u32, reset_seconds: u32) -> Self {
        Self {
            state: Arc::new(BudgetState {
                remaining: AtomicU32::new(remaining),
                reset_seconds: AtomicU32::new(reset_seconds),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            remaining: self.state.remaining.load(Ordering::Relaxed),
            reset_seconds: self.state.reset_seconds.load(Ordering::Relaxed),
        }
    }

    /// The delay the next request must wait, if the budget is nearly spent.
    #[must_use]
    pub fn throttle_delay(&self) -> Option<Duration> {
        let snapshot = self.snapshot();
        (snapshot.remaining < LOW_WATERMARK)
            .then(|| Duration::from_secs(u64::from(snapshot.reset_seconds)))
    }

    /// Gate an outbound request.
    ///
    /// Returns immediately while the budget is healthy; otherwise sleeps for
    /// the full reset window.
    pub async fn before_request(&self) {
        if let Some(delay) = self.throttle_delay() {
            let snapshot = self.snapshot();
            tracing::warn!(
                remaining = snapshot.remaining,
                reset_seconds = snapshot.reset_seconds,
                "ESI error budget low, pausing requests"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Record a response.
    ///
    /// Error statuses cost one unit locally. Header values, when present and
    /// parseable, replace the local counters outright.
    pub fn after_response(&self, status: u16, headers: &HttpHeaders) {
        if status >= 400 {
            let _ = self
                .state
                .remaining
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |r| {
                    Some(r.saturating_sub(1))
                });
        }

        let limit = headers.error_limit();
        if let Some(remaining) = limit.remaining {
            self.state.remaining.store(remaining, Ordering::Relaxed);
        }
        if let Some(reset) = limit.reset_seconds {
            self.state.reset_seconds.store(reset, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HttpHeaders {
        pairs.iter().copied().collect()
    }

    #[test]
    fn default_budget_is_conservative() {
        let budget = ErrorBudget::default();
        assert_eq!(
            budget.snapshot(),
            BudgetSnapshot {
                remaining: 100,
                reset_seconds: 60
            }
        );
        assert!(budget.throttle_delay().is_none());
    }

    #[test]
    fn error_status_decrements_locally() {
        let budget = ErrorBudget::new(50, 60);
        budget.after_response(404, &HttpHeaders::new());
        budget.after_response(502, &HttpHeaders::new());
        assert_eq!(budget.snapshot().remaining, 48);
    }

    #[test]
    fn success_status_without_headers_leaves_budget_alone() {
        let budget = ErrorBudget::new(50, 60);
        budget.after_response(200, &HttpHeaders::new());
        budget.after_response(304, &HttpHeaders::new());
        assert_eq!(budget.snapshot().remaining, 50);
    }

    #[test]
    fn decrement_saturates_at_zero() {
        let budget = ErrorBudget::new(0, 60);
        budget.after_response(500, &HttpHeaders::new());
        assert_eq!(budget.snapshot().remaining, 0);
    }

    #[test]
    fn server_headers_override_local_decrement() {
        let budget = ErrorBudget::new(80, 60);
        budget.after_response(
            420,
            &headers(&[
                ("X-Esi-Error-Limit-Remain", "5"),
                ("X-Esi-Error-Limit-Reset", "30"),
            ]),
        );
        assert_eq!(
            budget.snapshot(),
            BudgetSnapshot {
                remaining: 5,
                reset_seconds: 30
            }
        );
    }

    #[test]
    fn headers_apply_on_success_too() {
        let budget = ErrorBudget::new(7, 60);
        budget.after_response(200, &headers(&[(ERROR_LIMIT_REMAIN_HEADER, "100")]));
        let snapshot = budget.snapshot();
        assert_eq!(snapshot.remaining, 100);
        assert_eq!(snapshot.reset_seconds, 60);
    }

    #[test]
    fn unparseable_headers_are_ignored() {
        let budget = ErrorBudget::new(40, 60);
        budget.after_response(
            400,
            &headers(&[
                (ERROR_LIMIT_REMAIN_HEADER, "lots"),
                (ERROR_LIMIT_RESET_HEADER, "-3"),
            ]),
        );
        assert_eq!(
            budget.snapshot(),
            BudgetSnapshot {
                remaining: 39,
                reset_seconds: 60
            }
        );
    }

    #[test]
    fn clones_share_counters() {
        let budget = ErrorBudget::new(20, 60);
        let clone = budget.clone();
        clone.after_response(500, &HttpHeaders::new());
        assert_eq!(budget.snapshot().remaining, 19);
    }

    #[test]
    fn throttle_starts_below_watermark() {
        assert!(ErrorBudget::new(LOW_WATERMARK, 60).throttle_delay().is_none());
        assert_eq!(
            ErrorBudget::new(LOW_WATERMARK - 1, 45).throttle_delay(),
            Some(Duration::from_secs(45))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn before_request_waits_exactly_the_reset_window() {
        let budget = ErrorBudget::new(3, 30);
        let start = tokio::time::Instant::now();
        budget.before_request().await;
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn before_request_is_immediate_when_healthy() {
        let budget = ErrorBudget::default();
        let start = tokio::time::Instant::now();
        budget.before_request().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
