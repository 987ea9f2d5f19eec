//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::config::AllowedOrigins;
use crate::http::middleware::{require_client, ClientIdentity};
use crate::leaderboard::client::API_KEY_HEADER;
use crate::leaderboard::entry::{validate_name_value, validate_score_value};
use crate::leaderboard::{LeaderboardEntry, LeaderboardError, Submission, SubmitOutcome, ValidationError};
use crate::util::time::uptime_secs;

/// Upper bound for one request, store round trips included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let allow_origin = match &state.config.allowed_origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ),
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(API_KEY_HEADER),
        ]);

    // Writes go through the client checks, reads do not
    let leaderboard = post(submit_handler)
        .delete(reset_handler)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_client))
        .get(list_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed);

    Router::new()
        .route("/health", get(health_handler))
        .route("/leaderboard", leaderboard)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    store: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        store: state.leaderboard.backend_name(),
    })
}

// ============================================================================
// Leaderboard endpoints
// ============================================================================

async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let entries = state
        .leaderboard
        .fetch_top(state.leaderboard.capacity())
        .await?;

    Ok(Json(entries))
}

/// Raw submission; fields stay untyped so bad values map to precise errors
#[derive(Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    score: Value,
}

impl SubmitRequest {
    fn validate(&self) -> Result<Submission, ValidationError> {
        Ok(Submission {
            name: validate_name_value(&self.name)?,
            score: validate_score_value(&self.score)?,
        })
    }
}

async fn submit_handler(
    State(state): State<AppState>,
    Extension(client): Extension<ClientIdentity>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitOutcome>, AppError> {
    if let Err(wait) = state.limiter.check(&client.0) {
        let retry_after_secs = wait.as_secs_f64().ceil().max(1.0) as u64;
        warn!(client = %client.0, retry_after_secs, "Submission rate limited");
        return Err(AppError::RateLimited { retry_after_secs });
    }

    let Json(request) = body.map_err(|rejection| {
        debug!(error = %rejection, "Rejected submission body");
        AppError::Validation(ValidationError::Malformed(rejection.body_text()))
    })?;

    let submission = request.validate().map_err(AppError::Validation)?;
    let outcome = state.leaderboard.submit(submission).await?;

    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct ResetRequest {
    #[serde(default)]
    secret: String,
}

#[derive(Serialize)]
struct ResetResponse {
    success: bool,
}

async fn reset_handler(
    State(state): State<AppState>,
    body: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<ResetResponse>, AppError> {
    // An unreadable body carries no secret
    let secret = body.map(|Json(r)| r.secret).unwrap_or_default();

    if !state.leaderboard.reset(&secret).await? {
        return Err(AppError::Forbidden("Invalid secret".to_string()));
    }

    Ok(Json(ResetResponse { success: true }))
}

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(ValidationError),

    #[error("{0}")]
    Forbidden(String),

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LeaderboardError> for AppError {
    fn from(err: LeaderboardError) -> Self {
        match err {
            LeaderboardError::Validation(e) => AppError::Validation(e),
            LeaderboardError::Authorization(msg) => AppError::Forbidden(msg),
            LeaderboardError::RateLimited { retry_after_secs } => {
                AppError::RateLimited { retry_after_secs }
            }
            LeaderboardError::BackendUnavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string()
        }));

        match self {
            AppError::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
