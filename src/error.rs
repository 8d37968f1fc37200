//! Error types for the console

use std::io;

use thiserror::Error;

/// Result type alias for the console
pub type Result<T> = std::result::Result<T, Error>;

/// Console errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store error (load, save, or token serialization)
    #[error("Session error: {0}")]
    Session(String),

    /// Authorization exchange failure
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Platform API returned a non-success result
    #[error("API error {code}: {message}")]
    Api {
        /// Platform error code
        code: String,
        /// Platform error message
        message: String,
    },

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
