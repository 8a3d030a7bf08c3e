//! Error types for tabledrop
//!
//! This module provides error handling for the crate, including:
//! - Domain-specific error variants (configuration, lookup, materialization)
//! - HTTP status code mapping for API integration
//! - Machine-readable error codes for structured responses

use thiserror::Error;

/// Result type alias for tabledrop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tabledrop
///
/// Each variant carries enough context to diagnose the failure; the API layer
/// maps variants to HTTP responses via [`ToHttpStatus`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "AIRTABLE_API_KEY")
        key: Option<String>,
    },

    /// The requested field yielded no usable attachment
    #[error("no attachment found for field '{field}'")]
    AttachmentNotFound {
        /// The field name that was searched
        field: String,
    },

    /// A materialized file was requested by name but is not on disk
    #[error("file '{name}' not found")]
    FileNotFound {
        /// The requested file name
        name: String,
    },

    /// The remote server answered the attachment fetch with a non-success status
    #[error("upstream returned status {status} for {url}")]
    Upstream {
        /// HTTP status code returned by the remote server
        status: u16,
        /// The URL that was fetched
        url: String,
    },

    /// Network error from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - invalid configuration input
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::AttachmentNotFound { .. } => 404,
            Error::FileNotFound { .. } => 404,

            // 500 Internal Server Error - lookup or materialization failed.
            // Upstream fetch failures are folded in here rather than 502: the
            // client-visible contract is a plain 500 with the error text.
            Error::Upstream { .. } => 500,
            Error::Network(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::AttachmentNotFound { .. } => "attachment_not_found",
            Error::FileNotFound { .. } => "file_not_found",
            Error::Upstream { .. } => "upstream_error",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}
