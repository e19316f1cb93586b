//! Dossier Core Library
//!
//! This crate provides the foundational utilities for the Dossier CLI:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (models, limits, retry settings)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, Limits, RetrySettings};
pub use error::{AppError, AppResult};
