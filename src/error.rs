//! # Error Types
//!
//! Custom error types for Drone Console using `thiserror`.

use thiserror::Error;

/// Main error type for Drone Console
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Realtime channel errors
    #[error("channel error: {0}")]
    Channel(String),

    /// Wire protocol errors (malformed payloads on known events)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON envelope encode/decode errors
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP errors from the feed health probe
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Drone Console
pub type Result<T> = std::result::Result<T, ConsoleError>;
