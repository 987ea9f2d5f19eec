//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::leaderboard::LeaderboardService;
use crate::util::rate_limit::SubmissionLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub leaderboard: LeaderboardService,
    pub limiter: SubmissionLimiter,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let leaderboard = LeaderboardService::from_config(&config);
        Self::with_service(config, leaderboard)
    }

    /// State around an existing service (tests swap the store this way)
    pub fn with_service(config: Config, leaderboard: LeaderboardService) -> Self {
        let limiter = SubmissionLimiter::new(config.rate_limit_window, config.rate_limit_max);

        Self {
            config: Arc::new(config),
            leaderboard,
            limiter,
        }
    }
}
