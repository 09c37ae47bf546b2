//! Error types for the eventos ecosystem.

use thiserror::Error;

/// Errors that can occur outside of a single remote exchange.
#[derive(Error, Debug)]
pub enum EventosError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for eventos operations.
pub type EventosResult<T> = Result<T, EventosError>;
