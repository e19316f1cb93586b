//! Error types for the Dossier pipeline.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, generation-service transport,
//! malformed model output, and corpus misuse.

use thiserror::Error;

/// Unified error type for the Dossier pipeline.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// The variants encode how an error is handled, not just where it came from:
/// `ServiceUnavailable` is retried by the resilient client and, once retries
/// are exhausted, surfaced to the orchestrator as a single generic failure.
/// `MalformedResponse` is never retried; the component that detected it
/// absorbs it into a safe default value.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (fatal at startup, never recovered)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation service transport or availability failure
    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Model output did not match the expected structure
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Corpus-level misuse (duplicate names, document limit)
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the resilient client should retry after this error.
    ///
    /// Only transport/service failures are retried; malformed output is
    /// handled by the caller that expected the structure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ServiceUnavailable(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
