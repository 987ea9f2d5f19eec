//! Leaderboard entries and submission validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum player name length (in characters, after trimming)
pub const MAX_NAME_CHARS: usize = 20;

/// Highest score accepted
pub const MAX_SCORE: u32 = 100_000;

/// One ranked result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// When the score was recorded
    #[serde(rename = "date")]
    pub recorded_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
            recorded_at: Utc::now(),
        }
    }
}

/// Rejected submission shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name must be 1-20 characters long")]
    NameLength,

    #[error("Score must be a number")]
    ScoreType,

    #[error("Score must be between 0 and 100000")]
    ScoreRange,

    #[error("Invalid request: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Recover the error from its message (as returned by the API)
    pub fn from_message(message: &str) -> Self {
        [Self::NameLength, Self::ScoreType, Self::ScoreRange]
            .into_iter()
            .find(|e| e.to_string() == message)
            .unwrap_or_else(|| Self::Malformed(message.to_string()))
    }
}

/// Trim a name, strip angle brackets and check its length
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name: String = raw.trim().chars().filter(|c| !matches!(*c, '<' | '>')).collect();
    let name = name.trim();
    let len = name.chars().count();

    if len == 0 || len > MAX_NAME_CHARS {
        return Err(ValidationError::NameLength);
    }

    Ok(name.to_string())
}

/// Floor a score to an integer and check its range
pub fn validate_score(raw: f64) -> Result<u32, ValidationError> {
    if !raw.is_finite() {
        return Err(ValidationError::ScoreType);
    }

    let floored = raw.floor();
    if floored < 0.0 || floored > MAX_SCORE as f64 {
        return Err(ValidationError::ScoreRange);
    }

    Ok(floored as u32)
}

/// Validate a JSON score value (numbers only)
pub fn validate_score_value(raw: &serde_json::Value) -> Result<u32, ValidationError> {
    raw.as_f64()
        .ok_or(ValidationError::ScoreType)
        .and_then(validate_score)
}

/// Validate a JSON name value (strings only)
pub fn validate_name_value(raw: &serde_json::Value) -> Result<String, ValidationError> {
    raw.as_str()
        .ok_or(ValidationError::NameLength)
        .and_then(validate_name)
}
