//! Bounded, ranked top-N list

use serde::{Deserialize, Serialize};

use super::entry::LeaderboardEntry;

/// Ranked entries, highest score first.
///
/// Holds at most `capacity` entries. Equal scores keep insertion order, so an
/// earlier result outranks a later one with the same score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Rebuild from stored entries, restoring the ordering invariant
    pub fn from_entries(capacity: usize, mut entries: Vec<LeaderboardEntry>) -> Self {
        // Stable sort keeps stored order among equal scores
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(capacity);
        Self { capacity, entries }
    }

    /// Insert an entry at its rank and drop whatever falls off the end.
    ///
    /// Returns the 0-based rank, or `None` if the entry did not make the cut.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let rank = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());

        if rank >= self.capacity {
            return None;
        }

        self.entries.insert(rank, entry);
        self.entries.truncate(self.capacity);
        Some(rank)
    }

    /// Whether `score` would earn a place
    pub fn qualifies(&self, score: u32) -> bool {
        qualifies(score, &self.entries, self.capacity)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }

    pub fn top(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A score qualifies when the list has room or it beats the lowest entry
pub fn qualifies(score: u32, top: &[LeaderboardEntry], capacity: usize) -> bool {
    if top.len() < capacity {
        return true;
    }
    top.iter().map(|e| e.score).min().map_or(true, |min| score > min)
}
