//! Rate limiting for leaderboard submissions

use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Keyed rate limiter type alias
pub type KeyedLimiter<C> = RateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    C,
    NoOpMiddleware<<C as Clock>::Instant>,
>;

/// Default submissions allowed per window per client
pub const SUBMIT_RATE_LIMIT: u32 = 10;

/// Default window length in seconds
pub const SUBMIT_RATE_WINDOW_SECS: u64 = 60;

/// Build a quota allowing `max_requests` per `window`.
///
/// The whole allowance is available as a burst, and one slot comes back per
/// elapsed window, so no `window`-long span ever admits more than
/// `max_requests` from one client.
pub fn window_quota(window: Duration, max_requests: u32) -> Quota {
    let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(window)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

/// Per-client submission limiter
#[derive(Clone)]
pub struct SubmissionLimiter<C: Clock = DefaultClock> {
    limiter: Arc<KeyedLimiter<C>>,
    clock: C,
}

impl SubmissionLimiter<DefaultClock> {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self::with_clock(window, max_requests, DefaultClock::default())
    }
}

impl<C: Clock> SubmissionLimiter<C> {
    pub fn with_clock(window: Duration, max_requests: u32, clock: C) -> Self {
        let quota = window_quota(window, max_requests);
        Self {
            limiter: Arc::new(RateLimiter::dashmap_with_clock(quota, &clock)),
            clock,
        }
    }

    /// Check a submission for `client_key`.
    ///
    /// Returns how long the client has to wait when rejected.
    pub fn check(&self, client_key: &str) -> Result<(), Duration> {
        self.limiter
            .check_key(&client_key.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Drop state for clients whose allowance has fully refilled
    pub fn evict_idle(&self) {
        self.limiter.retain_recent();
    }

    /// Number of tracked client keys
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl Default for SubmissionLimiter<DefaultClock> {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(SUBMIT_RATE_WINDOW_SECS),
            SUBMIT_RATE_LIMIT,
        )
    }
}
