//! Core Error Types
//!
//! Defines the foundational error types used across the review orchestration
//! workspace. These error types are dependency-free (only thiserror + serde_json
//! + std) to keep the core crate lightweight.

use thiserror::Error;

/// Core error type for the review orchestration workspace.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Plan construction errors (malformed characteristics, bad config)
    #[error("Planning error: {0}")]
    Planning(String),

    /// A capability invocation reported an unrecoverable error
    #[error("Capability error: {0}")]
    Capability(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for review errors
pub type ReviewResult<T> = Result<T, ReviewError>;

impl ReviewError {
    /// Create a planning error
    pub fn planning(msg: impl Into<String>) -> Self {
        Self::Planning(msg.into())
    }

    /// Create a capability error
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convert ReviewError to a string
impl From<ReviewError> for String {
    fn from(err: ReviewError) -> String {
        err.to_string()
    }
}
