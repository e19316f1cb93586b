//! Cross-document summary with entity extraction.
//!
//! Independent of the query pipeline: one call over the full corpus
//! produces a Markdown summary plus the countries and key stakeholders
//! mentioned across the documents.

use crate::corpus::Document;
use crate::types::SummaryResult;
use dossier_core::AppResult;
use dossier_llm::{GenerationClient, GenerationRequest};
use dossier_prompt::{document_block, join_blocks, render_template, templates};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Summary used when the model's output cannot be parsed.
pub const DEGRADED_SUMMARY: &str =
    "Sorry, I received an invalid response from the AI while generating the summary. Please try again.";

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    summary: String,
    #[serde(default)]
    countries: Vec<String>,
    #[serde(default)]
    stakeholders: Vec<String>,
}

fn summary_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A concise but comprehensive summary of the key themes, findings, and conclusions across all the provided documents, formatted in Markdown."
            },
            "countries": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "All countries mentioned in the documents."
            },
            "stakeholders": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Key stakeholders (organizations, individuals, groups) mentioned in the documents."
            }
        },
        "required": ["summary", "countries", "stakeholders"]
    })
}

/// Produces the cross-document summary.
pub struct Summarizer {
    client: Arc<dyn GenerationClient>,
    model: String,
}

impl Summarizer {
    pub fn new(client: Arc<dyn GenerationClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Summarize the whole corpus and extract mentioned entities.
    ///
    /// Countries come back alphabetized and distinct; stakeholders distinct
    /// in model order. Unparseable output degrades to a fixed apology with
    /// empty entity lists.
    pub async fn summarize(&self, documents: &[Document]) -> AppResult<SummaryResult> {
        let blocks: Vec<String> = documents
            .iter()
            .map(|doc| document_block(&doc.name, &doc.content))
            .collect();

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), join_blocks(&blocks));
        let prompt = render_template(templates::SUMMARY_USER, &variables)?;

        let request = GenerationRequest::new(prompt, &self.model)
            .with_system(templates::SUMMARY_SYSTEM)
            .with_temperature(0.3)
            .with_response_schema(summary_schema());

        let response = self.client.generate(&request).await?;

        let payload = match serde_json::from_str::<SummaryPayload>(&response.content) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Malformed summary response; returning degraded summary");
                return Ok(SummaryResult {
                    summary_text: DEGRADED_SUMMARY.to_string(),
                    countries: Vec::new(),
                    stakeholders: Vec::new(),
                });
            }
        };

        let mut countries: Vec<String> = dedupe(payload.countries);
        countries.sort();

        Ok(SummaryResult {
            summary_text: payload.summary,
            countries,
            stakeholders: dedupe(payload.stakeholders),
        })
    }
}

/// Drop repeated names, keeping first occurrences in order.
fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_llm::MockClient;

    fn summarizer(mock: Arc<MockClient>) -> Summarizer {
        Summarizer::new(mock, "gemini-2.5-pro")
    }

    #[tokio::test]
    async fn test_summary_alphabetizes_and_dedupes_entities() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_json(serde_json::json!({
            "summary": "## Key themes\nBoth reports discuss mediation.",
            "countries": ["Norway", "Chad", "Norway", "Austria"],
            "stakeholders": ["Red Cross", "UNHCR", "Red Cross"]
        }));

        let documents = vec![
            Document::new("a.pdf", "report one"),
            Document::new("b.pdf", "report two"),
        ];

        let summary = summarizer(mock.clone()).summarize(&documents).await.unwrap();

        assert_eq!(summary.countries, vec!["Austria", "Chad", "Norway"]);
        assert_eq!(summary.stakeholders, vec!["Red Cross", "UNHCR"]);
        assert!(summary.summary_text.contains("mediation"));

        let prompt = &mock.requests()[0].prompt;
        assert!(prompt.contains("--- DOCUMENT START: a.pdf ---"));
        assert!(prompt.contains("--- DOCUMENT START: b.pdf ---"));
    }

    #[tokio::test]
    async fn test_malformed_summary_degrades() {
        let mock = Arc::new(MockClient::new());
        mock.enqueue_text("no json here");

        let documents = vec![Document::new("a.pdf", "content")];
        let summary = summarizer(mock).summarize(&documents).await.unwrap();

        assert_eq!(summary.summary_text, DEGRADED_SUMMARY);
        assert!(summary.countries.is_empty());
        assert!(summary.stakeholders.is_empty());
    }
}
