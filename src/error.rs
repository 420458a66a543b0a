//! Error types for pubmed-rag

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`RagError`]
pub type Result<T> = std::result::Result<T, RagError>;

/// Main error type for pubmed-rag
#[derive(Debug, Error)]
pub enum RagError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// No API key could be resolved for a provider
    #[error("Missing API key for {provider}: pass one explicitly or set {env_var}")]
    MissingApiKey { provider: String, env_var: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Non-success response from a provider API
    #[error("{provider} API error (HTTP {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider answered 2xx but the payload was not what we expected
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed dataset record
    #[error("Invalid dataset {path} (line {line}): {message}")]
    Dataset {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl From<String> for RagError {
    fn from(s: String) -> Self {
        RagError::Other(s)
    }
}

impl From<&str> for RagError {
    fn from(s: &str) -> Self {
        RagError::Other(s.to_string())
    }
}
