//! Error types for Mentora
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. The variants mirror the
//! user-facing taxonomy the CLI reports: configuration problems, the
//! provider error kinds, and the two persistence failure classes.

use thiserror::Error;

/// Main error type for Mentora operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, provider interactions, and chat persistence.
#[derive(Error, Debug)]
pub enum MentoraError {
    /// Configuration-related errors (bad file, bad values, missing credential)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Raw provider-level errors before taxonomy classification
    #[error("Provider error: {0}")]
    Provider(String),

    /// Retries against a rate-limited provider were exhausted
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Provider endpoint or model could not be found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider rejected the request input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Provider denied access for the configured credential
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Provider rejected the request shape
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request payload (usually an attachment) exceeds provider limits
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The local chat cache could not be written; data was not saved anywhere
    #[error("Local persistence error: {0}")]
    LocalPersistence(String),

    /// The remote store failed; the local cache still holds the data
    #[error("Remote persistence error: {0}")]
    RemotePersistence(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Mentora operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
