//! Error types for the DDNS update endpoint
//!
//! This module defines all error types used throughout the crate.
//! Request rejections (bad method, bad credentials, bad parameters) are not
//! errors of the system and live in [`crate::validator::Rejection`].

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS update endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing zone, token or hostnames)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The A record for a hostname could not be looked up
    #[error("Record lookup failed for {hostname}: {details}")]
    RecordLookupFailed {
        /// Hostname that was looked up
        hostname: String,
        /// Provider status and response body
        details: String,
    },

    /// The A record for a hostname could not be rewritten
    #[error("Record update failed for {hostname}: {details}")]
    RecordUpdateFailed {
        /// Hostname that was updated
        hostname: String,
        /// Provider status and error payload
        details: String,
    },

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a record lookup error
    pub fn lookup_failed(hostname: impl Into<String>, details: impl Into<String>) -> Self {
        Self::RecordLookupFailed {
            hostname: hostname.into(),
            details: details.into(),
        }
    }

    /// Create a record update error
    pub fn update_failed(hostname: impl Into<String>, details: impl Into<String>) -> Self {
        Self::RecordUpdateFailed {
            hostname: hostname.into(),
            details: details.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}
