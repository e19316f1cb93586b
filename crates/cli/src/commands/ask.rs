//! Ask command handler.
//!
//! Runs one query through the full pipeline against a directory of
//! documents.

use crate::ingest;
use clap::Args;
use dossier_core::{config::AppConfig, AppError, AppResult};
use dossier_llm::GenerationClient;
use dossier_pipeline::{CorpusHandle, Enricher, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;

/// Ask a question against a document collection
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Directory of plain-text documents
    #[arg(short, long)]
    pub docs: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(
        &self,
        config: &AppConfig,
        client: Arc<dyn GenerationClient>,
    ) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let corpus = CorpusHandle::new(config.limits.max_documents);
        let documents = ingest::load_documents(&self.docs)?;
        let ids = corpus.add_documents(documents).await?;

        // Enrichment runs in the background; the query does not wait for it
        // and simply sees pending descriptions on a cold start.
        let enricher = Enricher::new(Arc::clone(&client), &config.model, config.limits.clone());
        for id in &ids {
            enricher.enrich_in_background(corpus.clone(), id.clone());
        }

        let mut orchestrator = Orchestrator::new(client, config);
        let snapshot = corpus.snapshot().await;
        let outcome = orchestrator.handle_query(&self.query, &snapshot).await;

        tracing::debug!(?outcome, "Query finished");

        let turn = orchestrator
            .log()
            .last()
            .ok_or_else(|| AppError::Other("No turn was committed for the query".to_string()))?;

        if self.json {
            let output = serde_json::json!({
                "answer": turn.text,
                "sources": turn.sources,
                "outcome": format!("{:?}", outcome),
                "model": config.model,
                "provider": config.provider,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", turn.text);

            if !turn.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &turn.sources {
                    println!("- {}", source);
                }
            }
        }

        Ok(())
    }
}
