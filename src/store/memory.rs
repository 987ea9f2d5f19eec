//! In-process leaderboard store

use dashmap::DashMap;
use std::sync::Arc;

use crate::leaderboard::{Leaderboard, LeaderboardEntry};

use super::Insertion;

/// Leaderboards kept in memory, keyed by leaderboard identifier
#[derive(Clone, Default)]
pub struct MemoryStore {
    boards: Arc<DashMap<String, Leaderboard>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, key: &str, capacity: usize) -> Leaderboard {
        self.boards
            .get(key)
            .map(|board| Leaderboard::from_entries(capacity, board.entries().to_vec()))
            .unwrap_or_else(|| Leaderboard::new(capacity))
    }

    /// Insert under the entry lock, so concurrent submissions serialize
    pub fn insert_bounded(&self, key: &str, capacity: usize, entry: LeaderboardEntry) -> Insertion {
        let mut board = self
            .boards
            .entry(key.to_string())
            .or_insert_with(|| Leaderboard::new(capacity));
        let rank = board.insert(entry);

        Insertion {
            rank,
            board: board.value().clone(),
        }
    }

    pub fn clear(&self, key: &str) {
        self.boards.remove(key);
    }
}
