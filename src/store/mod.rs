//! Leaderboard storage backends

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::config::Config;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};

/// Result of a bounded insert
#[derive(Debug, Clone)]
pub struct Insertion {
    /// 0-based rank of the new entry, `None` if it fell off the list
    pub rank: Option<usize>,
    /// The list after the insert
    pub board: Leaderboard,
}

/// Backing store for ranked lists
#[derive(Clone)]
pub enum LeaderboardStore {
    Memory(MemoryStore),
    Rest(RestStore),
}

impl LeaderboardStore {
    /// REST store when a URL is configured, memory otherwise
    pub fn from_config(config: &Config) -> Self {
        match &config.store_url {
            Some(url) => Self::Rest(RestStore::new(url, config.store_service_key.clone())),
            None => Self::Memory(MemoryStore::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Rest(_) => "rest",
        }
    }

    pub async fn load(&self, key: &str, capacity: usize) -> Result<Leaderboard, StoreError> {
        match self {
            Self::Memory(store) => Ok(store.load(key, capacity)),
            Self::Rest(store) => store.load(key, capacity).await,
        }
    }

    /// Insert an entry keeping the list sorted and within `capacity`
    pub async fn insert_bounded(
        &self,
        key: &str,
        capacity: usize,
        entry: LeaderboardEntry,
    ) -> Result<Insertion, StoreError> {
        match self {
            Self::Memory(store) => Ok(store.insert_bounded(key, capacity, entry)),
            Self::Rest(store) => store.insert_bounded(key, capacity, entry).await,
        }
    }

    pub async fn clear(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => {
                store.clear(key);
                Ok(())
            }
            Self::Rest(store) => store.clear(key).await,
        }
    }

    /// Release backend resources
    pub fn shutdown(&self) {
        if let Self::Rest(store) = self {
            store.shutdown();
        }
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(#[source] reqwest::Error),
}
