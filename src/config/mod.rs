//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::util::rate_limit::{SUBMIT_RATE_LIMIT, SUBMIT_RATE_WINDOW_SECS};

/// Default leaderboard identifier in the backing store
pub const DEFAULT_LEADERBOARD_KEY: &str = "typing_game_leaderboard";

/// Default number of ranked entries kept
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Origins allowed to call the leaderboard API
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*` - every origin
    Any,
    /// Explicit allow-list
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated list, `*` meaning any origin
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        match self {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(list) => {
                let origin = origin.trim_end_matches('/');
                list.iter().any(|o| o == origin)
            }
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// PostgREST base URL of the backing store (memory store when unset)
    pub store_url: Option<String>,
    /// Service key for the backing store
    pub store_service_key: Option<String>,
    /// Leaderboard identifier in the store
    pub leaderboard_key: String,
    /// Maximum number of ranked entries
    pub leaderboard_size: usize,

    /// Allowed client origins for CORS and write access
    pub allowed_origins: AllowedOrigins,
    /// Optional API key required on writes
    pub api_key: Option<String>,
    /// Secret required to reset the leaderboard
    pub reset_secret: Option<String>,

    /// Rate limit window for submissions
    pub rate_limit_window: Duration,
    /// Submissions allowed per window per client
    pub rate_limit_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            store_url: None,
            store_service_key: None,
            leaderboard_key: DEFAULT_LEADERBOARD_KEY.to_string(),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            allowed_origins: AllowedOrigins::Any,
            api_key: None,
            reset_secret: None,
            rate_limit_window: Duration::from_secs(SUBMIT_RATE_WINDOW_SECS),
            rate_limit_max: SUBMIT_RATE_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?
        } else if let Ok(addr) = env::var("SERVER_ADDR") {
            addr.parse().map_err(|_| ConfigError::InvalidAddress)?
        } else {
            defaults.server_addr
        };

        let leaderboard_size: usize = parse_var("LEADERBOARD_SIZE", defaults.leaderboard_size)?;
        if leaderboard_size == 0 {
            return Err(ConfigError::Invalid {
                var: "LEADERBOARD_SIZE",
                value: "0".to_string(),
            });
        }

        let window_secs: u64 = parse_var("RATE_LIMIT_WINDOW_SECS", SUBMIT_RATE_WINDOW_SECS)?;

        Ok(Self {
            server_addr,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),

            store_url: optional_var("STORE_URL"),
            store_service_key: optional_var("STORE_SERVICE_KEY"),
            leaderboard_key: optional_var("LEADERBOARD_KEY").unwrap_or(defaults.leaderboard_key),
            leaderboard_size,

            allowed_origins: optional_var("ALLOWED_ORIGINS")
                .map(|raw| AllowedOrigins::parse(&raw))
                .unwrap_or(defaults.allowed_origins),
            api_key: optional_var("API_KEY"),
            reset_secret: optional_var("RESET_SECRET"),

            rate_limit_window: Duration::from_secs(window_secs.max(1)),
            rate_limit_max: parse_var("RATE_LIMIT_MAX_REQUESTS", defaults.rate_limit_max)?,
        })
    }
}

/// Read a variable, treating blank values as unset
fn optional_var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            var: name,
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wildcard_origins() {
        assert_eq!(AllowedOrigins::parse("*"), AllowedOrigins::Any);
        assert_eq!(AllowedOrigins::parse(""), AllowedOrigins::Any);
        assert_eq!(
            AllowedOrigins::parse("https://a.example, *"),
            AllowedOrigins::Any
        );
    }

    #[test]
    fn test_parse_origin_list() {
        let origins = AllowedOrigins::parse("https://a.example, https://b.example/");
        assert_eq!(
            origins,
            AllowedOrigins::List(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string(),
            ])
        );
        assert!(origins.allows("https://b.example"));
        assert!(origins.allows("https://a.example/"));
        assert!(!origins.allows("https://evil.example"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.leaderboard_size, 10);
        assert_eq!(config.rate_limit_max, 10);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert!(config.store_url.is_none());
        assert!(config.allowed_origins.allows("https://anything.example"));
    }
}
