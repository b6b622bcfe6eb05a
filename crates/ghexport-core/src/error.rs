// SPDX-License-Identifier: Apache-2.0

//! Error types for ghexport.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur during an export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A required request field is missing or empty.
    #[error("Invalid request: {message}")]
    Validation {
        /// Which field was rejected and why.
        message: String,
    },

    /// GitHub rejected the credential while resolving the authenticated user.
    #[error("Could not fetch GitHub user information (HTTP {status}): {message}")]
    Authentication {
        /// HTTP status returned by `GET /user`.
        status: u16,
        /// Error message from GitHub.
        message: String,
    },

    /// GitHub refused to create the repository (name collision, validation, ...).
    #[error("Repository creation failed: {message}")]
    RepositoryCreation {
        /// HTTP status returned by `POST /user/repos`.
        status: u16,
        /// Error message from GitHub.
        message: String,
    },

    /// A single file could not be uploaded.
    ///
    /// Recorded in the upload results; never aborts a run.
    #[error("Failed to upload {path}: {message}")]
    Upload {
        /// Repository-relative path of the file.
        path: String,
        /// Error message from GitHub or the transport.
        message: String,
    },

    /// The project root could not be enumerated at all.
    #[error("Cannot read project root {root}: {message}")]
    Enumeration {
        /// Root directory that was requested.
        root: String,
        /// Underlying failure.
        message: String,
    },

    /// GitHub answered with a body that does not match the expected shape.
    #[error("Unexpected response from GitHub: {message}")]
    InvalidResponse {
        /// Decoding failure.
        message: String,
    },

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ExportError {
    /// Shorthand for a [`ExportError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ExportError {
    fn from(err: config::ConfigError) -> Self {
        ExportError::Config {
            message: err.to_string(),
        }
    }
}
