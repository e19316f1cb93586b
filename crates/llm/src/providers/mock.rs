//! Scripted mock generation provider.
//!
//! Used by pipeline and retry tests: responses are served from a FIFO
//! script, every request is recorded, and call counts are observable.
//! While not a real model, it exercises the full `GenerationClient`
//! surface deterministically.

use crate::client::{GenerationClient, GenerationRequest, GenerationResponse, TokenUsage};
use dossier_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted outcome for a mock call.
enum Scripted {
    Text(String),
    Unavailable(String),
}

/// Mock provider serving scripted responses in order.
///
/// An exhausted script yields `ServiceUnavailable`, so a test that expects
/// zero calls fails loudly if a call slips through.
#[derive(Default)]
pub struct MockClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockClient {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text response.
    pub fn enqueue_text(&self, text: impl Into<String>) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Scripted::Text(text.into()));
    }

    /// Queue a JSON response.
    pub fn enqueue_json(&self, value: serde_json::Value) {
        self.enqueue_text(value.to_string());
    }

    /// Queue a service failure.
    pub fn enqueue_unavailable(&self, reason: impl Into<String>) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Scripted::Unavailable(reason.into()));
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock requests lock").len()
    }

    /// Snapshot of every request received, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("mock requests lock").clone()
    }
}

#[async_trait::async_trait]
impl GenerationClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
        self.requests
            .lock()
            .expect("mock requests lock")
            .push(request.clone());

        let next = self.script.lock().expect("mock script lock").pop_front();

        match next {
            Some(Scripted::Text(text)) => Ok(GenerationResponse {
                content: text.trim().to_string(),
                model: request.model.clone(),
                usage: TokenUsage::default(),
            }),
            Some(Scripted::Unavailable(reason)) => Err(AppError::ServiceUnavailable(reason)),
            None => Err(AppError::ServiceUnavailable(
                "mock script exhausted".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_script_in_order() {
        let mock = MockClient::new();
        mock.enqueue_text("first");
        mock.enqueue_unavailable("down");
        mock.enqueue_text("second");

        let request = GenerationRequest::new("q", "m");

        assert_eq!(mock.generate(&request).await.unwrap().content, "first");
        assert!(mock.generate(&request).await.is_err());
        assert_eq!(mock.generate(&request).await.unwrap().content, "second");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockClient::new();
        mock.enqueue_text("ok");

        let request = GenerationRequest::new("what is X", "m").with_max_tokens(1000);
        mock.generate(&request).await.unwrap();

        let seen = mock.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "what is X");
        assert_eq!(seen[0].max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn test_mock_exhausted_script_fails() {
        let mock = MockClient::new();
        let request = GenerationRequest::new("q", "m");
        let err = mock.generate(&request).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }
}
