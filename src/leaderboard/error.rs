//! Leaderboard error taxonomy

use crate::store::StoreError;

use super::entry::ValidationError;

/// Why a leaderboard operation was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaderboardError {
    /// Bad name or score; never reaches the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Origin, API key or secret rejected
    #[error("Forbidden: {0}")]
    Authorization(String),

    /// Too many submissions from one client
    #[error("Too many submissions, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Store or service unreachable
    #[error("Leaderboard unavailable: {0}")]
    BackendUnavailable(String),
}

impl LeaderboardError {
    /// Whether trying again later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LeaderboardError::RateLimited { .. } | LeaderboardError::BackendUnavailable(_)
        )
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        LeaderboardError::BackendUnavailable(err.to_string())
    }
}
