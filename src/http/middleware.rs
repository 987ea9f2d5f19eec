//! Client identification and write-access checks

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::app::AppState;
use crate::http::routes::AppError;
use crate::leaderboard::client::API_KEY_HEADER;

/// Rate-limit key of the calling client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    /// First `X-Forwarded-For` hop, else the peer address, else "unknown"
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let key = match (forwarded, peer) {
            (Some(hop), _) => hop.to_string(),
            (None, Some(addr)) => addr.ip().to_string(),
            (None, None) => "unknown".to_string(),
        };

        Self(key)
    }
}

/// Middleware for write routes: origin allow-list, API key, client identity
pub async fn require_client(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();

    if let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) {
        if !state.config.allowed_origins.allows(origin) {
            warn!(origin, "Write from disallowed origin");
            return Err(AppError::Forbidden("Origin not allowed".to_string()));
        }
    }

    if let Some(expected) = state.config.api_key.as_deref() {
        let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            warn!("Write with missing or invalid API key");
            return Err(AppError::Forbidden("Invalid API key".to_string()));
        }
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = ClientIdentity::from_parts(request.headers(), peer);

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
