//! Background document enrichment.
//!
//! Each newly added document gets a short description (used by the selector
//! as a retrieval hint) and, where the document states them, a title and a
//! publication date (used by the synthesizer for citations). Enrichment runs
//! one independent task per document and never blocks query handling; a
//! query that arrives first simply sees pending descriptions.

use crate::corpus::{CorpusHandle, DescriptionState};
use crate::truncate;
use crate::types::DocumentMetadata;
use chrono::NaiveDate;
use dossier_core::{AppResult, Limits};
use dossier_llm::{GenerationClient, GenerationRequest};
use dossier_prompt::{render_template, templates};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Deserialize)]
struct MetadataPayload {
    title: String,
    date: String,
}

fn metadata_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "The document's title, or \"N/A\" if it does not state one."
            },
            "date": {
                "type": "STRING",
                "description": "The document's publication date in YYYY-MM-DD format, or \"N/A\"."
            }
        },
        "required": ["title", "date"]
    })
}

/// Generates per-document descriptions and title/date metadata.
#[derive(Clone)]
pub struct Enricher {
    client: Arc<dyn GenerationClient>,
    model: String,
    limits: Limits,
}

impl Enricher {
    pub fn new(client: Arc<dyn GenerationClient>, model: impl Into<String>, limits: Limits) -> Self {
        Self {
            client,
            model: model.into(),
            limits,
        }
    }

    /// Generate a one-sentence description of a document.
    ///
    /// Only a bounded content prefix is sent; a description does not need
    /// the whole document.
    pub async fn describe(&self, content: &str) -> AppResult<String> {
        let excerpt = truncate::prefix(content, self.limits.description_chars);

        let mut variables = HashMap::new();
        variables.insert("content".to_string(), excerpt.to_string());
        let prompt = render_template(templates::DESCRIPTION_PROMPT, &variables)?;

        let request = GenerationRequest::new(prompt, &self.model)
            .with_temperature(0.1)
            .with_max_tokens(self.limits.description_max_tokens)
            .with_thinking_budget(self.limits.description_thinking_budget);

        let response = self.client.generate(&request).await?;
        Ok(response.content)
    }

    /// Extract title/date metadata from a document.
    ///
    /// Sends the head and tail of the content (titles open documents, dates
    /// often close them). Malformed model output degrades to empty metadata
    /// rather than failing enrichment.
    pub async fn extract_metadata(&self, content: &str) -> AppResult<DocumentMetadata> {
        let excerpt = truncate::head_tail(
            content,
            self.limits.metadata_head_chars,
            self.limits.metadata_tail_chars,
        );

        let mut variables = HashMap::new();
        variables.insert("content".to_string(), excerpt);
        let prompt = render_template(templates::METADATA_PROMPT, &variables)?;

        let request = GenerationRequest::new(prompt, &self.model)
            .with_temperature(0.1)
            .with_response_schema(metadata_schema());

        let response = self.client.generate(&request).await?;

        match serde_json::from_str::<MetadataPayload>(&response.content) {
            Ok(payload) => Ok(DocumentMetadata {
                title: normalize_field(payload.title),
                date: normalize_date(payload.date),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Malformed metadata response; leaving title/date unset");
                Ok(DocumentMetadata::default())
            }
        }
    }

    /// Spawn the enrichment task for one document.
    ///
    /// On description failure the document gets the failure sentinel rather
    /// than staying pending; metadata failure leaves title/date unset. A
    /// document removed mid-flight aborts silently.
    pub fn enrich_in_background(&self, corpus: CorpusHandle, doc_id: String) -> JoinHandle<()> {
        let enricher = self.clone();

        tokio::spawn(async move {
            let snapshot = corpus.snapshot().await;
            let Some(document) = snapshot.get(&doc_id) else {
                tracing::debug!(doc_id = %doc_id, "Document removed before enrichment started");
                return;
            };
            let name = document.name.clone();
            let content = document.content.clone();
            drop(snapshot);

            match enricher.describe(&content).await {
                Ok(description) => {
                    tracing::debug!(document = %name, "Description generated");
                    corpus
                        .set_description(&doc_id, DescriptionState::Ready(description))
                        .await;
                }
                Err(err) => {
                    tracing::warn!(document = %name, error = %err, "Description generation failed");
                    corpus
                        .set_description(&doc_id, DescriptionState::Failed)
                        .await;
                }
            }

            match enricher.extract_metadata(&content).await {
                Ok(metadata) => {
                    corpus.set_metadata(&doc_id, metadata).await;
                }
                Err(err) => {
                    tracing::warn!(document = %name, error = %err, "Metadata extraction failed");
                }
            }
        })
    }
}

/// Map "N/A" and blank strings to absence.
fn normalize_field(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Keep only dates the model actually formatted as YYYY-MM-DD.
fn normalize_date(value: String) -> Option<String> {
    let trimmed = value.trim();
    if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use dossier_llm::MockClient;

    fn enricher(mock: Arc<MockClient>) -> Enricher {
        Enricher::new(mock, "gemini-2.5-flash", Limits::default())
    }

    #[tokio::test]
    async fn test_describe_truncates_content() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("A long report about X.");

        let long_content = "x".repeat(20_000);
        let description = enricher(mock.clone()).describe(&long_content).await.unwrap();

        assert_eq!(description, "A long report about X.");
        let request = &mock.requests()[0];
        // 8000-char excerpt plus the instruction text
        assert!(request.prompt.len() < 9_000);
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.thinking_budget, Some(50));
        assert!(!request.expects_json());
    }

    #[tokio::test]
    async fn test_metadata_normalizes_na_and_bad_dates() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_json(serde_json::json!({ "title": "N/A", "date": "last spring" }));

        let metadata = enricher(mock).extract_metadata("content").await.unwrap();
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.date, None);
    }

    #[tokio::test]
    async fn test_metadata_keeps_valid_values() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_json(serde_json::json!({ "title": "Annual Report", "date": "2024-03-01" }));

        let metadata = enricher(mock).extract_metadata("content").await.unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Annual Report"));
        assert_eq!(metadata.date.as_deref(), Some("2024-03-01"));
    }

    #[tokio::test]
    async fn test_metadata_malformed_degrades_to_empty() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("not json at all");

        let metadata = enricher(mock).extract_metadata("content").await.unwrap();
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.date, None);
    }

    #[tokio::test]
    async fn test_background_task_sets_description() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("Notes about X.");
        mock.enqueue_json(serde_json::json!({ "title": "X Notes", "date": "N/A" }));

        let corpus = CorpusHandle::new(50);
        let ids = corpus
            .add_documents(vec![Document::new("a.pdf", "content about X")])
            .await
            .unwrap();

        enricher(mock)
            .enrich_in_background(corpus.clone(), ids[0].clone())
            .await
            .unwrap();

        let doc = corpus.snapshot().await.documents()[0].clone();
        assert_eq!(doc.description, DescriptionState::Ready("Notes about X.".into()));
        assert_eq!(doc.title.as_deref(), Some("X Notes"));
        assert_eq!(doc.date, None);
    }

    #[tokio::test]
    async fn test_background_task_failure_sets_sentinel() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_unavailable("down");
        mock.enqueue_unavailable("still down");

        let corpus = CorpusHandle::new(50);
        let ids = corpus
            .add_documents(vec![Document::new("a.pdf", "content")])
            .await
            .unwrap();

        enricher(mock)
            .enrich_in_background(corpus.clone(), ids[0].clone())
            .await
            .unwrap();

        let doc = corpus.snapshot().await.documents()[0].clone();
        assert_eq!(doc.description, DescriptionState::Failed);
        assert_eq!(doc.description.hint(), crate::corpus::NO_DESCRIPTION_HINT);
    }

    #[tokio::test]
    async fn test_background_task_on_removed_document_is_noop() {
        let mock = Arc::new(MockClient::new());

        let corpus = CorpusHandle::new(50);
        let ids = corpus
            .add_documents(vec![Document::new("a.pdf", "content")])
            .await
            .unwrap();
        corpus.remove(&ids[0]).await;

        enricher(mock.clone())
            .enrich_in_background(corpus.clone(), ids[0].clone())
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 0);
    }
}
