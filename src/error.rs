//! Error types for stock-sync
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Per-record failures live in [`ValidationError`](crate::record::ValidationError)
//! and are normally recovered by the engine; every other variant below aborts
//! the run it occurs in.

use crate::record::ValidationError;
use thiserror::Error;

/// The main error type for stock-sync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Record Errors
    // ============================================================================
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Transient fetch failure: {message}")]
    TransientFetch { message: String },

    #[error("Fatal fetch failure: {message}")]
    FatalFetch { message: String },

    #[error("Pagination did not terminate: {message}")]
    PaginationLoop { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Store Errors
    // ============================================================================
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse config YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

}

impl Error {
    /// Create a transient fetch error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientFetch {
            message: message.into(),
        }
    }

    /// Create a fatal fetch error
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::FatalFetch {
            message: message.into(),
        }
    }

    /// Create a pagination loop error
    pub fn pagination_loop(message: impl Into<String>) -> Self {
        Self::PaginationLoop {
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error classified by HTTP status.
    ///
    /// 429 and 5xx are worth one more attempt; any other status is final.
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let message = format!("HTTP {status}: {}", body.into());
        if is_transient_status(status) {
            Self::transient(message)
        } else {
            Self::fatal(message)
        }
    }

    /// Check if this error may clear up when the same request is repeated
    pub fn is_transient(&self) -> bool {
        match self {
            Error::TransientFetch { .. } => true,
            Error::Http(e) => is_network_failure(e),
            _ => false,
        }
    }

    /// Check if this error aborts the run (everything except per-record validation)
    pub fn is_run_fatal(&self) -> bool {
        !matches!(self, Error::Validation(_))
    }
}

/// Check if an HTTP status code is transient
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Failures below the HTTP layer: the request or its body never made it
/// across the connection intact
pub(crate) fn is_network_failure(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
}

/// Result type alias for stock-sync
pub type Result<T> = std::result::Result<T, Error>;
