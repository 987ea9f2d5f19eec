//! PostgREST (Supabase style) leaderboard store

use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::leaderboard::{Leaderboard, LeaderboardEntry};

use super::{Insertion, StoreError};

/// Table holding one row per leaderboard
pub const LEADERBOARD_TABLE: &str = "leaderboards";

/// Timeout for a single store request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stored row: the whole ranked list as a JSON column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeaderboardRow {
    id: String,
    entries: Vec<LeaderboardEntry>,
}

/// REST store with a lazily created, reusable connection pool.
///
/// The HTTP client is built on first use and shared by every clone. It is
/// dropped on `shutdown` or after a connection failure, and rebuilt by the
/// next request.
#[derive(Clone)]
pub struct RestStore {
    connection: Arc<RwLock<Option<Client>>>,
    base_url: String,
    service_key: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, service_key: Option<String>) -> Self {
        Self {
            connection: Arc::new(RwLock::new(None)),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Whether a client is currently held
    pub fn is_connected(&self) -> bool {
        self.connection.read().is_some()
    }

    /// Get the shared client, connecting if needed
    fn client(&self) -> Result<Client, StoreError> {
        if let Some(client) = self.connection.read().as_ref() {
            return Ok(client.clone());
        }

        let mut connection = self.connection.write();
        if let Some(client) = connection.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StoreError::Request)?;
        *connection = Some(client.clone());

        info!(url = %self.base_url, "Connected to leaderboard store");
        Ok(client)
    }

    /// Release the connection pool; the next request reconnects
    pub fn shutdown(&self) {
        if self.connection.write().take().is_some() {
            info!(url = %self.base_url, "Leaderboard store connection closed");
        }
    }

    fn on_request_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_connect() || err.is_timeout() {
            warn!(error = %err, "Leaderboard store unreachable, dropping connection");
            self.connection.write().take();
        }
        StoreError::Request(err)
    }

    /// Get the REST API URL for a table
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Add the service key headers when configured
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.service_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status: status.as_u16(), body });
        }
        Ok(response)
    }

    /// GET expecting a single row
    async fn get_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Option<T>, StoreError> {
        let url = format!("{}?{}", self.rest_url(table), query);

        let response = self
            .authorized(self.client()?.get(&url))
            .header("Content-Type", "application/json")
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(|e| self.on_request_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            // No rows found
            return Ok(None);
        }

        let response = Self::check(response).await?;
        response.json().await.map(Some).map_err(StoreError::Parse)
    }

    /// Insert or replace a row by primary key
    async fn upsert<T: Serialize>(&self, table: &str, data: &T) -> Result<(), StoreError> {
        let url = format!("{}?on_conflict=id", self.rest_url(table));

        let response = self
            .authorized(self.client()?.post(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(data)
            .send()
            .await
            .map_err(|e| self.on_request_error(e))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, query: &str) -> Result<(), StoreError> {
        let url = format!("{}?{}", self.rest_url(table), query);

        let response = self
            .authorized(self.client()?.delete(&url))
            .send()
            .await
            .map_err(|e| self.on_request_error(e))?;

        Self::check(response).await?;
        Ok(())
    }

    pub async fn load(&self, key: &str, capacity: usize) -> Result<Leaderboard, StoreError> {
        let query = format!("id=eq.{}&select=id,entries", key);
        let row: Option<LeaderboardRow> = self.get_one(LEADERBOARD_TABLE, &query).await?;
        let entries = row.map(|r| r.entries).unwrap_or_default();
        Ok(Leaderboard::from_entries(capacity, entries))
    }

    /// Read, insert and write back the whole list.
    ///
    /// Not atomic across concurrent writers: the last write wins.
    pub async fn insert_bounded(
        &self,
        key: &str,
        capacity: usize,
        entry: LeaderboardEntry,
    ) -> Result<Insertion, StoreError> {
        let mut board = self.load(key, capacity).await?;
        let rank = board.insert(entry);

        let row = LeaderboardRow {
            id: key.to_string(),
            entries: board.entries().to_vec(),
        };
        self.upsert(LEADERBOARD_TABLE, &row).await?;

        Ok(Insertion { rank, board })
    }

    pub async fn clear(&self, key: &str) -> Result<(), StoreError> {
        let query = format!("id=eq.{}", key);
        self.delete(LEADERBOARD_TABLE, &query).await
    }
}
