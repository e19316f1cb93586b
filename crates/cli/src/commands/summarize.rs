//! Summarize command handler.
//!
//! Produces the cross-document summary with extracted entities.

use crate::ingest;
use clap::Args;
use dossier_core::{config::AppConfig, AppError, AppResult};
use dossier_llm::GenerationClient;
use dossier_pipeline::{CorpusHandle, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;

/// Summarize a document collection and extract entities
#[derive(Args, Debug)]
pub struct SummarizeCommand {
    /// Directory of plain-text documents
    #[arg(short, long)]
    pub docs: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SummarizeCommand {
    /// Execute the summarize command.
    pub async fn execute(
        &self,
        config: &AppConfig,
        client: Arc<dyn GenerationClient>,
    ) -> AppResult<()> {
        tracing::info!("Executing summarize command");

        let corpus = CorpusHandle::new(config.limits.max_documents);
        let documents = ingest::load_documents(&self.docs)?;
        corpus.add_documents(documents).await?;

        let mut orchestrator = Orchestrator::new(client, config);
        let snapshot = corpus.snapshot().await;
        let outcome = orchestrator.handle_summary(&snapshot).await;

        tracing::debug!(?outcome, "Summary finished");

        let turn = orchestrator
            .log()
            .last()
            .ok_or_else(|| AppError::Other("No turn was committed for the summary".to_string()))?;

        if self.json {
            let output = serde_json::json!({
                "text": turn.text,
                "summary": turn.summary,
                "outcome": format!("{:?}", outcome),
                "model": config.summary_model,
                "provider": config.provider,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        println!("{}", turn.text);

        if let Some(summary) = &turn.summary {
            println!();
            println!("{}", summary.summary_text);

            if !summary.countries.is_empty() {
                println!();
                println!("Countries:");
                for country in &summary.countries {
                    println!("- {}", country);
                }
            }

            if !summary.stakeholders.is_empty() {
                println!();
                println!("Stakeholders:");
                for stakeholder in &summary.stakeholders {
                    println!("- {}", stakeholder);
                }
            }
        }

        Ok(())
    }
}
