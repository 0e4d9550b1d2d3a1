//! Error types for Palaver
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Palaver operations
///
/// This enum encompasses all possible errors that can occur while talking
/// to the realtime server, calling the HTTP collaborators (upload, profile,
/// geocoding), loading configuration, and validating user input.
///
/// Note that the session registry itself has no error variants: its
/// operations are total, and unknown keys degrade to no-ops by design.
#[derive(Error, Debug)]
pub enum PalaverError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form/field validation errors (login fields, profile fields)
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// The offending field name
        field: String,
        /// Explanation of the failure
        message: String,
    },

    /// Transport errors from the HTTP collaborators (upload, profile, geocode)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed or unexpected payloads from the realtime server
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Authentication errors (rejected login, failed reconnect)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The realtime connection was closed by the peer or torn down locally
    #[error("Connection closed")]
    ConnectionClosed,

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

    /// Keyring/session token storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl PalaverError {
    /// Convenience constructor for validation errors
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::error::PalaverError;
    ///
    /// let err = PalaverError::validation("nickname", "too short");
    /// assert_eq!(err.to_string(), "Validation error: nickname: too short");
    /// ```
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for Palaver operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
