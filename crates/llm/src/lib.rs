//! Generation-service integration crate for the Dossier pipeline.
//!
//! This crate provides a provider-agnostic abstraction for the external
//! language-generation service. Every pipeline stage talks to the service
//! through the [`GenerationClient`] trait, and every call goes through the
//! [`ResilientClient`] retry decorator.
//!
//! # Providers
//! - **Gemini**: Google `generateContent` HTTP API (default)
//! - **Mock**: scripted deterministic client for tests
//!
//! # Example
//! ```no_run
//! use dossier_llm::{GenerationClient, GenerationRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = GenerationRequest::new("Hello, world!", "gemini-2.5-flash");
//! let response = client.generate(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod retry;

// Re-export main types
pub use client::{GenerationClient, GenerationRequest, GenerationResponse, TokenUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, MockClient};
pub use retry::{ResilientClient, RetryPolicy};
