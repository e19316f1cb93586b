//! Query orchestration: sequence the pipeline stages, maintain the
//! conversation log, and map every failure mode to a user-facing message.

use crate::conversation::{ConversationLog, Turn};
use crate::corpus::Corpus;
use crate::extractor::Extractor;
use crate::selector::Selector;
use crate::summarizer::Summarizer;
use crate::synthesizer::Synthesizer;
use crate::types::ExtractionResult;
use dossier_core::AppConfig;
use dossier_llm::GenerationClient;
use std::sync::Arc;

/// Message for a query against an empty corpus.
pub const NO_DOCUMENTS_MESSAGE: &str =
    "I can't answer questions without any documents. Please add some files first.";

/// Message when selection finds nothing relevant.
pub const NO_RELEVANT_DOCUMENTS_MESSAGE: &str =
    "I couldn't find any documents relevant to your question. Try rephrasing it or adding more files.";

/// Message for a summary request against an empty corpus.
pub const SUMMARY_NEEDS_DOCUMENTS_MESSAGE: &str =
    "Please add at least one document to generate a summary.";

/// The single generic failure message; internal detail goes to the log only.
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

/// Heading of a committed summary turn.
pub const SUMMARY_TITLE: &str = "Summary of the document collection";

fn no_extractable_message(scanned: usize) -> String {
    format!(
        "I scanned {} document(s) but found nothing relevant to your question in them.",
        scanned
    )
}

fn selection_status(found: usize) -> String {
    format!(
        "Found {} potentially relevant document(s). Reading them now...",
        found
    )
}

fn synthesis_status(usable: usize) -> String {
    format!("Pulling together an answer from {} source(s)...", usable)
}

/// Terminal state of one query or summary request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A cited answer (or summary) was committed
    Answered,

    /// The corpus was empty; no external calls were made
    NoDocuments,

    /// Selection returned nothing relevant
    NoRelevantDocuments,

    /// Every selected document extracted to empty points
    NoExtractableContent,

    /// The generation service stayed unavailable or a stage misbehaved
    Failed,
}

/// Sequences Selector → Extractor(×N, parallel) → Synthesizer over one
/// conversation.
///
/// Owns the conversation log. Every terminal state commits exactly one
/// assistant turn and leaves no transient status behind; per-document
/// extraction failures degrade to empty results instead of failing the
/// query.
pub struct Orchestrator {
    selector: Selector,
    extractor: Arc<Extractor>,
    synthesizer: Synthesizer,
    summarizer: Summarizer,
    log: ConversationLog,
}

impl Orchestrator {
    /// Build the pipeline stages from configuration.
    ///
    /// The client should already be wrapped in a
    /// [`dossier_llm::ResilientClient`]; the orchestrator only ever sees
    /// post-retry failures.
    pub fn new(client: Arc<dyn GenerationClient>, config: &AppConfig) -> Self {
        Self {
            selector: Selector::new(Arc::clone(&client), &config.model, &config.limits),
            extractor: Arc::new(Extractor::new(
                Arc::clone(&client),
                &config.model,
                &config.limits,
            )),
            synthesizer: Synthesizer::new(Arc::clone(&client), &config.model),
            summarizer: Summarizer::new(client, &config.summary_model),
            log: ConversationLog::new(),
        }
    }

    /// The conversation log, for rendering.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Answer one query against a corpus snapshot.
    pub async fn handle_query(&mut self, query: &str, corpus: &Corpus) -> QueryOutcome {
        self.log.push(Turn::user(query));

        if corpus.is_empty() {
            self.log.commit(Turn::assistant(NO_DOCUMENTS_MESSAGE));
            return QueryOutcome::NoDocuments;
        }

        // Retrieval stage
        let selected = match self.selector.select(query, corpus.documents()).await {
            Ok(selected) => selected,
            Err(err) => {
                tracing::error!(error = %err, "Selection failed");
                return self.fail();
            }
        };

        if selected.is_empty() {
            self.log
                .commit(Turn::assistant(NO_RELEVANT_DOCUMENTS_MESSAGE));
            return QueryOutcome::NoRelevantDocuments;
        }

        self.log.set_status(selection_status(selected.len()));

        // Map stage: one task per document, join-all, no shared state.
        // A failed sibling degrades to an empty result and the rest proceed.
        let handles: Vec<_> = selected
            .iter()
            .map(|document| {
                let extractor = Arc::clone(&self.extractor);
                let query = query.to_string();
                let document = document.clone();
                tokio::spawn(async move {
                    let info = document.info();
                    match extractor.extract(&query, &document).await {
                        Ok(result) => result,
                        Err(err) => {
                            tracing::warn!(
                                document = %info.name,
                                error = %err,
                                "Extraction failed; excluding document from synthesis"
                            );
                            ExtractionResult::empty(info)
                        }
                    }
                })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;
        let results: Vec<ExtractionResult> = joined
            .into_iter()
            .zip(&selected)
            .map(|(joined, document)| match joined {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(
                        document = %document.name,
                        error = %err,
                        "Extraction task aborted; excluding document from synthesis"
                    );
                    ExtractionResult::empty(document.info())
                }
            })
            .collect();

        let usable: Vec<ExtractionResult> =
            results.into_iter().filter(|r| !r.is_empty()).collect();

        if usable.is_empty() {
            let sources: Vec<String> = selected.iter().map(|d| d.name.clone()).collect();
            self.log.commit(
                Turn::assistant(no_extractable_message(selected.len())).with_sources(sources),
            );
            return QueryOutcome::NoExtractableContent;
        }

        self.log.set_status(synthesis_status(usable.len()));

        // Reduce stage
        match self.synthesizer.synthesize(query, &usable).await {
            Ok(result) => {
                self.log
                    .commit(Turn::assistant(result.answer).with_sources(result.sources));
                QueryOutcome::Answered
            }
            Err(err) => {
                tracing::error!(error = %err, "Synthesis failed");
                self.fail()
            }
        }
    }

    /// Produce the cross-document summary turn.
    pub async fn handle_summary(&mut self, corpus: &Corpus) -> QueryOutcome {
        if corpus.is_empty() {
            self.log
                .commit(Turn::assistant(SUMMARY_NEEDS_DOCUMENTS_MESSAGE));
            return QueryOutcome::NoDocuments;
        }

        self.log
            .set_status(format!("Summarizing {} document(s)...", corpus.len()));

        match self.summarizer.summarize(corpus.documents()).await {
            Ok(summary) => {
                self.log
                    .commit(Turn::assistant(SUMMARY_TITLE).with_summary(summary));
                QueryOutcome::Answered
            }
            Err(err) => {
                tracing::error!(error = %err, "Summary generation failed");
                self.fail()
            }
        }
    }

    /// Commit the single generic failure turn, clearing any status.
    fn fail(&mut self) -> QueryOutcome {
        self.log.commit(Turn::assistant(GENERIC_FAILURE_MESSAGE));
        QueryOutcome::Failed
    }
}
