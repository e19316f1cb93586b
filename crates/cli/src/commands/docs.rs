//! Docs command handler.
//!
//! Lists a document collection with enriched descriptions and metadata.
//! Unlike queries, this command waits for enrichment so the listing is
//! complete.

use crate::ingest;
use clap::Args;
use dossier_core::{config::AppConfig, AppError, AppResult};
use dossier_llm::GenerationClient;
use dossier_pipeline::{CorpusHandle, Enricher};
use std::path::PathBuf;
use std::sync::Arc;

/// List a document collection with enriched descriptions
#[derive(Args, Debug)]
pub struct DocsCommand {
    /// Directory of plain-text documents
    #[arg(short, long)]
    pub docs: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocsCommand {
    /// Execute the docs command.
    pub async fn execute(
        &self,
        config: &AppConfig,
        client: Arc<dyn GenerationClient>,
    ) -> AppResult<()> {
        tracing::info!("Executing docs command");

        let corpus = CorpusHandle::new(config.limits.max_documents);
        let documents = ingest::load_documents(&self.docs)?;
        let ids = corpus.add_documents(documents).await?;

        let enricher = Enricher::new(client, &config.model, config.limits.clone());
        let handles: Vec<_> = ids
            .iter()
            .map(|id| enricher.enrich_in_background(corpus.clone(), id.clone()))
            .collect();

        // A listing is only useful with descriptions, so wait here
        futures::future::join_all(handles).await;

        let snapshot = corpus.snapshot().await;

        if self.json {
            let entries: Vec<_> = snapshot
                .documents()
                .iter()
                .map(|doc| {
                    serde_json::json!({
                        "name": doc.name,
                        "description": doc.description.label(),
                        "title": doc.title,
                        "date": doc.date,
                    })
                })
                .collect();

            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        for doc in snapshot.documents() {
            println!("{}", doc.name);
            println!("  {}", doc.description.label());
            if let Some(title) = &doc.title {
                println!("  Title: {}", title);
            }
            if let Some(date) = &doc.date {
                println!("  Date: {}", date);
            }
        }

        println!();
        println!(
            "{} document(s), limit {}",
            snapshot.len(),
            config.limits.max_documents
        );

        Ok(())
    }
}
