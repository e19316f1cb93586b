//! Retrieval stage: narrow the corpus to documents worth reading in full.

use crate::corpus::Document;
use dossier_core::{AppResult, Limits};
use dossier_llm::{GenerationClient, GenerationRequest};
use dossier_prompt::{render_template, templates};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SelectionPayload {
    relevant_documents: Vec<String>,
}

fn selection_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "relevant_documents": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Names of the catalog documents worth reading in full to answer the question. Empty if none are relevant."
            }
        },
        "required": ["relevant_documents"]
    })
}

/// Picks the subset of the corpus worth reading for a query.
pub struct Selector {
    client: Arc<dyn GenerationClient>,
    model: String,

    /// Corpus size at or below which everything is returned without a call
    threshold: usize,

    /// Cap on how many documents the model may select
    max_selected: usize,
}

impl Selector {
    pub fn new(client: Arc<dyn GenerationClient>, model: impl Into<String>, limits: &Limits) -> Self {
        Self {
            client,
            model: model.into(),
            threshold: limits.selection_threshold,
            max_selected: limits.max_selected,
        }
    }

    /// Select the documents relevant to `query`, preserving corpus order.
    ///
    /// Small corpora skip relevance filtering entirely: reading everything
    /// is already cheap. Otherwise one schema-constrained call sees each
    /// document's name and best-available description. Output that cannot
    /// be parsed fails closed to the empty set, which the orchestrator
    /// reports as "no relevant documents" rather than silently reading the
    /// whole corpus.
    pub async fn select(&self, query: &str, documents: &[Document]) -> AppResult<Vec<Document>> {
        if documents.len() <= self.threshold {
            tracing::debug!(
                corpus_size = documents.len(),
                threshold = self.threshold,
                "Corpus at or below selection threshold; taking all documents"
            );
            return Ok(documents.to_vec());
        }

        let catalog = documents
            .iter()
            .map(|doc| format!("- {}: {}", doc.name, doc.description.hint()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut variables = HashMap::new();
        variables.insert("catalog".to_string(), catalog);
        variables.insert("query".to_string(), query.to_string());
        variables.insert("max_selected".to_string(), self.max_selected.to_string());
        let prompt = render_template(templates::SELECTOR_USER, &variables)?;

        let request = GenerationRequest::new(prompt, &self.model)
            .with_system(templates::SELECTOR_SYSTEM)
            .with_temperature(0.1)
            .with_response_schema(selection_schema());

        let response = self.client.generate(&request).await?;

        let payload = match serde_json::from_str::<SelectionPayload>(&response.content) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Malformed selection response; failing closed to empty set");
                return Ok(Vec::new());
            }
        };

        let wanted: HashSet<&str> = payload
            .relevant_documents
            .iter()
            .take(self.max_selected)
            .map(String::as_str)
            .collect();

        let selected: Vec<Document> = documents
            .iter()
            .filter(|doc| wanted.contains(doc.name.as_str()))
            .cloned()
            .collect();

        tracing::info!(
            corpus_size = documents.len(),
            selected = selected.len(),
            "Selection completed"
        );

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DescriptionState;
    use dossier_llm::MockClient;

    fn docs(names: &[&str]) -> Vec<Document> {
        names
            .iter()
            .map(|name| Document::new(*name, format!("content of {}", name)))
            .collect()
    }

    fn selector(mock: Arc<MockClient>) -> Selector {
        Selector::new(mock, "gemini-2.5-flash", &Limits::default())
    }

    #[tokio::test]
    async fn test_small_corpus_short_circuits_without_calls() {
        let mock = Arc::new(MockClient::new());
        let documents = docs(&["a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf", "f.pdf", "g.pdf"]);

        let selected = selector(mock.clone())
            .select("what is X", &documents)
            .await
            .unwrap();

        assert_eq!(selected.len(), 7);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_large_corpus_filters_preserving_order() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_json(serde_json::json!({
            "relevant_documents": ["h.pdf", "b.pdf"]
        }));

        let documents = docs(&[
            "a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf", "f.pdf", "g.pdf", "h.pdf",
        ]);

        let selected = selector(mock.clone())
            .select("what is X", &documents)
            .await
            .unwrap();

        // Corpus order, not model order
        let names: Vec<&str> = selected.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "h.pdf"]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_catalog_uses_description_hints() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_json(serde_json::json!({ "relevant_documents": [] }));

        let mut documents = docs(&[
            "a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf", "f.pdf", "g.pdf", "h.pdf",
        ]);
        documents[0].description = DescriptionState::Ready("Budget figures for 2024.".into());
        documents[1].description = DescriptionState::Failed;

        selector(mock.clone())
            .select("what is the budget", &documents)
            .await
            .unwrap();

        let prompt = &mock.requests()[0].prompt;
        assert!(prompt.contains("- a.pdf: Budget figures for 2024."));
        assert!(prompt.contains("- b.pdf: No description available."));
        assert!(mock.requests()[0].expects_json());
    }

    #[tokio::test]
    async fn test_unknown_names_are_ignored() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_json(serde_json::json!({
            "relevant_documents": ["made-up.pdf", "c.pdf"]
        }));

        let documents = docs(&[
            "a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf", "f.pdf", "g.pdf", "h.pdf",
        ]);

        let selected = selector(mock).select("q", &documents).await.unwrap();
        let names: Vec<&str> = selected.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["c.pdf"]);
    }

    #[tokio::test]
    async fn test_malformed_response_fails_closed() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("I think documents a and b look good");

        let documents = docs(&[
            "a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf", "f.pdf", "g.pdf", "h.pdf",
        ]);

        let selected = selector(mock).select("q", &documents).await.unwrap();
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_unavailable("down");

        let documents = docs(&[
            "a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf", "f.pdf", "g.pdf", "h.pdf",
        ]);

        let err = selector(mock).select("q", &documents).await.unwrap_err();
        assert!(matches!(
            err,
            dossier_core::AppError::ServiceUnavailable(_)
        ));
    }
}
