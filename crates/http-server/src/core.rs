use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::services::error::EngineError;
use engine::services::store::MemoryStore;
use engine::services::stream::{MAX_TICK, MIN_TICK};
use serde_json::json;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// Shared state for every handler: the injected store plus the runtime
// configuration.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            store: Arc::new(MemoryStore::new()),
            config,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub domain: String,
    pub inbox_ttl_minutes: i64,
    pub stream: StreamConfig,
}

#[derive(Clone)]
pub struct StreamConfig {
    pub mode: StreamMode,
    /// Bounds for the random delay between synthesized arrivals.
    /// Shrunk to milliseconds by the test suites.
    pub min_tick: Duration,
    pub max_tick: Duration,
}

/// Capability of the deployment target's transport. Hosts that cannot
/// hold a connection open (serverless-style) get the snapshot variant:
/// same synthesis, delivered as a single JSON body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamMode {
    Push,
    Snapshot,
}

impl FromStr for StreamMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "push" => Ok(StreamMode::Push),
            "snapshot" => Ok(StreamMode::Snapshot),
            _ => Err(()),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the environment, falling back to the
    /// demo defaults.
    pub fn from_env() -> Self {
        AppConfig {
            domain: env::var("DOMAIN").unwrap_or_else(|_| "tempmail.org".to_string()),
            inbox_ttl_minutes: env::var("INBOX_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            stream: StreamConfig {
                mode: env::var("STREAM_MODE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(StreamMode::Push),
                min_tick: MIN_TICK,
                max_tick: MAX_TICK,
            },
        }
    }
}

// Define a custom error type for our API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        // Every engine failure is a missing inbox or email.
        ApiError::NotFound(err.to_string())
    }
}

// Convert `ApiError` into the wire shapes: 404 carries `{message}`,
// 500 carries `{message, error}`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": message })),
            )
                .into_response(),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error", "error": detail })),
            )
                .into_response(),
        }
    }
}
