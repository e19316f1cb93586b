//! Map stage: per-document extraction of query-relevant key points.

use crate::corpus::Document;
use crate::truncate;
use crate::types::ExtractionResult;
use dossier_core::{AppResult, Limits};
use dossier_llm::{GenerationClient, GenerationRequest};
use dossier_prompt::{render_template, templates};
use std::collections::HashMap;
use std::sync::Arc;

/// Extracts query-relevant key points from one document at a time.
///
/// Each call is independent and carries no shared mutable state, so one
/// extractor behind an `Arc` serves a whole fan-out. The model is told to
/// answer with an empty response when the document holds nothing relevant;
/// that empty result is how irrelevant-but-selected documents are pruned
/// before synthesis.
pub struct Extractor {
    client: Arc<dyn GenerationClient>,
    model: String,
    max_chars: usize,
    max_tokens: u32,
}

impl Extractor {
    pub fn new(client: Arc<dyn GenerationClient>, model: impl Into<String>, limits: &Limits) -> Self {
        Self {
            client,
            model: model.into(),
            max_chars: limits.extract_chars,
            max_tokens: limits.extract_max_tokens,
        }
    }

    /// Extract the points of `document` relevant to `query`.
    ///
    /// Content is truncated to a bounded prefix and output is capped to
    /// bound per-document cost and latency.
    pub async fn extract(&self, query: &str, document: &Document) -> AppResult<ExtractionResult> {
        let excerpt = truncate::prefix(&document.content, self.max_chars);

        let mut variables = HashMap::new();
        variables.insert("name".to_string(), document.name.clone());
        variables.insert("content".to_string(), excerpt.to_string());
        variables.insert("query".to_string(), query.to_string());
        let prompt = render_template(templates::EXTRACTOR_USER, &variables)?;

        let request = GenerationRequest::new(prompt, &self.model)
            .with_system(templates::EXTRACTOR_SYSTEM)
            .with_temperature(0.2)
            .with_max_tokens(self.max_tokens);

        let response = self.client.generate(&request).await?;

        tracing::debug!(
            document = %document.name,
            points_len = response.content.len(),
            "Extraction completed"
        );

        Ok(ExtractionResult {
            document: document.info(),
            points: response.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_llm::MockClient;

    fn extractor(mock: Arc<MockClient>) -> Extractor {
        Extractor::new(mock, "gemini-2.5-flash", &Limits::default())
    }

    #[tokio::test]
    async fn test_extract_returns_points_with_document_info() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("- X is defined in section 2.");

        let mut document = Document::new("a.pdf", "long content about X");
        document.title = Some("About X".to_string());

        let result = extractor(mock.clone())
            .extract("what is X", &document)
            .await
            .unwrap();

        assert_eq!(result.points, "- X is defined in section 2.");
        assert_eq!(result.document.name, "a.pdf");
        assert_eq!(result.document.title.as_deref(), Some("About X"));
        assert!(!result.is_empty());

        let request = &mock.requests()[0];
        assert!(request.prompt.contains("--- DOCUMENT START: a.pdf ---"));
        assert!(request.prompt.contains("\"what is X\""));
        assert_eq!(request.max_tokens, Some(1_000));
    }

    #[tokio::test]
    async fn test_extract_truncates_long_content() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("points");

        let document = Document::new("big.pdf", "y".repeat(60_000));
        extractor(mock.clone())
            .extract("q", &document)
            .await
            .unwrap();

        // 25,000-char excerpt plus template overhead
        assert!(mock.requests()[0].prompt.len() < 26_000);
    }

    #[tokio::test]
    async fn test_irrelevant_document_yields_empty_result() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("");

        let document = Document::new("a.pdf", "nothing about the topic");
        let result = extractor(mock).extract("what is X", &document).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_extract_is_deterministic_for_scripted_responses() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("- point one");
        mock.enqueue_text("- point one");

        let document = Document::new("a.pdf", "content");
        let extractor = extractor(mock);

        let first = extractor.extract("q", &document).await.unwrap();
        let second = extractor.extract("q", &document).await.unwrap();

        assert_eq!(first.points, second.points);
        assert_eq!(first.document.name, second.document.name);
    }
}
