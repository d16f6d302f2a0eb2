//! Error types for pushlang-core

use thiserror::Error;

/// Main error type for the pushlang-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (connect, timeout, body decode)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Non-success response from the GitHub API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// External command exited unsuccessfully
    #[error("command `{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// Classifier produced output we could not use
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Gist could not be updated
    #[error("publish error: {0}")]
    Publish(String),
}

impl Error {
    /// True for API responses that indicate the resource is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }
}

/// Result type alias for pushlang-core
pub type Result<T> = std::result::Result<T, Error>;
