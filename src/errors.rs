// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for the external collaborators of the hostname pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors resolving the instance identity from the metadata service
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Metadata service could not be reached or answered with an error
    #[error("Metadata service unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// A required metadata field was missing or empty
    #[error("Metadata field missing: {0}")]
    MissingField(&'static str),

    /// The primary address was not an IP address
    #[error("Invalid primary address: {0}")]
    InvalidAddress(String),

    /// The instance identity document could not be decoded
    #[error("Invalid instance identity document: {0}")]
    InvalidDocument(String),
}

/// Errors reading or writing instance tags
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The instance resource does not exist in the region
    #[error("Instance not found: {0}")]
    NotFound(String),

    /// Credentials were missing or not permitted for the call
    #[error("Tag API authorization failed: {0}")]
    Unauthorized(String),

    /// Transport or service failure
    #[error("Tag API error: {0}")]
    Api(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for identity resolution
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Result type for tag operations
pub type TagResult<T> = Result<T, TagError>;

impl From<serde_json::Error> for IdentityError {
    fn from(err: serde_json::Error) -> Self {
        IdentityError::InvalidDocument(err.to_string())
    }
}
