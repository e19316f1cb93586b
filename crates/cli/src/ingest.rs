//! Document ingestion from a local directory.
//!
//! The pipeline core never parses files; this module is the ingestion
//! collaborator that turns already-plain-text files (.txt, .md) into
//! documents. PDF or other binary formats must be converted to text
//! upstream before they land in the ingest directory.

use dossier_core::{AppError, AppResult};
use dossier_pipeline::Document;
use std::path::Path;
use walkdir::WalkDir;

/// File extensions accepted as plain text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Load all plain-text documents under `dir`, sorted by path for a
/// deterministic corpus order.
///
/// Unreadable or non-UTF-8 files are skipped with a warning rather than
/// failing the whole load.
pub fn load_documents(dir: &Path) -> AppResult<Vec<Document>> {
    if !dir.is_dir() {
        return Err(AppError::Config(format!(
            "Document directory does not exist: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.path().is_file() && is_text_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(name = %name, bytes = content.len(), "Loaded document");
                documents.push(Document::new(name, content));
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable file");
            }
        }
    }

    tracing::info!(count = documents.len(), dir = %dir.display(), "Documents loaded");

    Ok(documents)
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
