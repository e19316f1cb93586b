//! Reduce stage: combine extracted points into one cited answer.

use crate::types::{ExtractionResult, SynthesisResult};
use dossier_core::AppResult;
use dossier_llm::{GenerationClient, GenerationRequest};
use dossier_prompt::{document_block, join_blocks, render_template, templates};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Answer used when the model's synthesis output cannot be parsed.
pub const DEGRADED_ANSWER: &str =
    "Sorry, I received an invalid response from the AI. Please try again.";

#[derive(Debug, Deserialize)]
struct SynthesisPayload {
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
}

fn synthesis_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "answer": {
                "type": "STRING",
                "description": "The detailed answer to the user's question, synthesized from the provided key points, with inline citations. If the answer cannot be found, this field should explain that."
            },
            "sources": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Filenames of the documents actually used as sources for the answer. Empty if the answer is not drawn from the documents."
            }
        },
        "required": ["answer", "sources"]
    })
}

/// Produces the final cited answer from non-empty extraction results.
pub struct Synthesizer {
    client: Arc<dyn GenerationClient>,
    model: String,
}

impl Synthesizer {
    pub fn new(client: Arc<dyn GenerationClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Synthesize one answer from the given extraction results.
    ///
    /// Callers pass only non-empty results; with nothing to synthesize the
    /// orchestrator short-circuits before reaching this stage. Whatever the
    /// model claims, the returned `sources` are intersected with the input
    /// documents' names and deduplicated, so a fabricated name can never
    /// reach the caller. Unparseable output degrades to a fixed apology
    /// with empty sources instead of failing the query.
    pub async fn synthesize(
        &self,
        query: &str,
        results: &[ExtractionResult],
    ) -> AppResult<SynthesisResult> {
        let blocks: Vec<String> = results
            .iter()
            .map(|result| {
                let mut body = String::new();
                if let Some(title) = &result.document.title {
                    body.push_str(&format!("Title: {}\n", title));
                }
                if let Some(date) = &result.document.date {
                    body.push_str(&format!("Date: {}\n", date));
                }
                body.push_str("Key points:\n");
                body.push_str(&result.points);
                document_block(&result.document.name, &body)
            })
            .collect();

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), join_blocks(&blocks));
        variables.insert("query".to_string(), query.to_string());
        let prompt = render_template(templates::SYNTHESIZER_USER, &variables)?;

        let request = GenerationRequest::new(prompt, &self.model)
            .with_system(templates::SYNTHESIZER_SYSTEM)
            .with_temperature(0.2)
            .with_response_schema(synthesis_schema());

        let response = self.client.generate(&request).await?;

        let payload = match serde_json::from_str::<SynthesisPayload>(&response.content) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Malformed synthesis response; returning degraded answer");
                return Ok(SynthesisResult {
                    answer: DEGRADED_ANSWER.to_string(),
                    sources: Vec::new(),
                });
            }
        };

        let known: HashSet<&str> = results
            .iter()
            .map(|r| r.document.name.as_str())
            .collect();

        let mut seen = HashSet::new();
        let sources: Vec<String> = payload
            .sources
            .into_iter()
            .filter(|name| known.contains(name.as_str()) && seen.insert(name.clone()))
            .collect();

        tracing::info!(sources = sources.len(), "Synthesis completed");

        Ok(SynthesisResult {
            answer: payload.answer,
            sources,
        })
    }
}
