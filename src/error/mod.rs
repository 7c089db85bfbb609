//! Error types for stackwright.

use thiserror::Error;

/// Primary error type for all engine operations.
///
/// Expected tool failures (I/O, network, bad cloud responses) never surface
/// here: the executor folds them into result text. What does surface is the
/// unrecoverable stuff — a tool name the registry has never heard of, a
/// model-call failure, or an external cancellation.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The model asked for a tool the registry does not carry. This is a
    /// registry/model mismatch, not a runtime condition, and it is fatal to
    /// the turn in progress.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Canceled")]
    Canceled,
}

impl EngineError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, EngineError>;
