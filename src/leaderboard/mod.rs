//! Ranked leaderboard: entries, validation, service and client

pub mod board;
pub mod client;
pub mod entry;
pub mod error;
pub mod service;

pub use board::{qualifies, Leaderboard};
pub use client::LeaderboardClient;
pub use entry::{LeaderboardEntry, ValidationError, MAX_NAME_CHARS, MAX_SCORE};
pub use error::LeaderboardError;
pub use service::{LeaderboardService, SubmitOutcome, Submission};
