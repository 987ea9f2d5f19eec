//! HTTP client for the leaderboard API

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use super::entry::{validate_name, LeaderboardEntry, ValidationError};
use super::error::LeaderboardError;
use super::service::SubmitOutcome;

/// Timeout for leaderboard calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Leaderboard API client used at the end of a game session
#[derive(Clone)]
pub struct LeaderboardClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LeaderboardClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url(&self) -> String {
        format!("{}/leaderboard", self.base_url)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Top `n` entries
    pub async fn fetch_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let response = self
            .client
            .get(self.url())
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        let mut entries: Vec<LeaderboardEntry> =
            response.json().await.map_err(transport_error)?;
        entries.truncate(n);
        Ok(entries)
    }

    /// Submit a score.
    ///
    /// The name is validated locally first, so bad names never leave the
    /// client.
    pub async fn submit(&self, name: &str, score: u32) -> Result<SubmitOutcome, LeaderboardError> {
        let name = validate_name(name)?;

        let response = self
            .with_key(self.client.post(self.url()))
            .json(&json!({ "name": name, "score": score }))
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        response.json().await.map_err(transport_error)
    }

    /// Administrative reset; `Ok(false)` when the secret was refused
    pub async fn reset(&self, secret: &str) -> Result<bool, LeaderboardError> {
        let response = self
            .with_key(self.client.delete(self.url()))
            .json(&json!({ "secret": secret }))
            .send()
            .await
            .map_err(transport_error)?;

        match check_status(response).await {
            Ok(_) => Ok(true),
            Err(LeaderboardError::Authorization(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn transport_error(err: reqwest::Error) -> LeaderboardError {
    warn!(error = %err, "Leaderboard request failed");
    LeaderboardError::BackendUnavailable(err.to_string())
}

/// Map API error statuses onto the error taxonomy
async fn check_status(response: Response) -> Result<Response, LeaderboardError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };

    Err(match status {
        StatusCode::BAD_REQUEST => ValidationError::from_message(&message).into(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LeaderboardError::Authorization(message),
        StatusCode::TOO_MANY_REQUESTS => LeaderboardError::RateLimited { retry_after_secs },
        _ => LeaderboardError::BackendUnavailable(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_name_rejected_locally() {
        // Nothing listens here; validation must fail before any request
        let client = LeaderboardClient::new("http://127.0.0.1:9");
        let err = client.submit(&"x".repeat(21), 10).await.unwrap_err();
        assert_eq!(err, LeaderboardError::Validation(ValidationError::NameLength));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_retryable() {
        let client = LeaderboardClient::new("http://127.0.0.1:9/");
        let err = client.fetch_top(10).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::BackendUnavailable(_)));
        assert!(err.is_retryable());
    }
}
