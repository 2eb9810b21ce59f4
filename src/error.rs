//! Error types for repo-courier
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for repo-courier
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Scheduler dropped the request before a response was delivered")]
    RequestDropped,

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Malformed link header entry: {entry}")]
    LinkHeader { entry: String },

    #[error("Response body has no '{field}' array")]
    MissingResults { field: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Download Errors
    // ============================================================================
    #[error("Archive extraction failed: {message}")]
    Archive { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a link header error
    pub fn link_header(entry: impl Into<String>) -> Self {
        Self::LinkHeader {
            entry: entry.into(),
        }
    }

    /// Create a missing results error
    pub fn missing_results(field: impl Into<String>) -> Self {
        Self::MissingResults {
            field: field.into(),
        }
    }

    /// Create an archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }
}

/// Result type alias for repo-courier
pub type Result<T> = std::result::Result<T, Error>;
