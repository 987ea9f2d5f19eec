//! Leaderboard operations on top of a store

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::store::LeaderboardStore;

use super::entry::{validate_name, validate_score, LeaderboardEntry, ValidationError};
use super::error::LeaderboardError;

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub score: u32,
}

impl Submission {
    /// Validate raw input: trimmed, sanitized name and floored score
    pub fn new(name: &str, score: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            score: validate_score(score)?,
        })
    }
}

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    #[serde(rename = "success")]
    pub accepted: bool,
    /// 0-based rank of the new entry, absent when it did not make the list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Ranked list operations for one leaderboard
#[derive(Clone)]
pub struct LeaderboardService {
    store: LeaderboardStore,
    key: String,
    capacity: usize,
    reset_secret: Option<String>,
}

impl LeaderboardService {
    pub fn new(
        store: LeaderboardStore,
        key: impl Into<String>,
        capacity: usize,
        reset_secret: Option<String>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            capacity,
            reset_secret,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LeaderboardStore::from_config(config),
            config.leaderboard_key.clone(),
            config.leaderboard_size,
            config.reset_secret.clone(),
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Top `n` entries, highest score first
    pub async fn fetch_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let board = self
            .store
            .load(&self.key, self.capacity)
            .await
            .map_err(|e| {
                error!(error = %e, key = %self.key, "Failed to load leaderboard");
                LeaderboardError::from(e)
            })?;

        Ok(board.top(n))
    }

    /// Record a validated submission
    pub async fn submit(&self, submission: Submission) -> Result<SubmitOutcome, LeaderboardError> {
        let entry = LeaderboardEntry::new(submission.name, submission.score);

        let insertion = self
            .store
            .insert_bounded(&self.key, self.capacity, entry)
            .await
            .map_err(|e| {
                error!(error = %e, key = %self.key, "Failed to save leaderboard entry");
                LeaderboardError::from(e)
            })?;

        info!(
            score = submission.score,
            rank = ?insertion.rank,
            "Leaderboard submission recorded"
        );

        Ok(SubmitOutcome {
            accepted: true,
            rank: insertion.rank,
            leaderboard: insertion.board.into_entries(),
        })
    }

    /// Clear the leaderboard if `secret` matches the configured one.
    ///
    /// Without a configured secret every reset is refused.
    pub async fn reset(&self, secret: &str) -> Result<bool, LeaderboardError> {
        let authorized = self
            .reset_secret
            .as_deref()
            .is_some_and(|expected| expected == secret);

        if !authorized {
            warn!(key = %self.key, "Leaderboard reset refused");
            return Ok(false);
        }

        self.store.clear(&self.key).await.map_err(|e| {
            error!(error = %e, key = %self.key, "Failed to reset leaderboard");
            LeaderboardError::from(e)
        })?;

        info!(key = %self.key, "Leaderboard reset");
        Ok(true)
    }

    /// Close the store connection
    pub fn shutdown(&self) {
        self.store.shutdown();
    }
}
