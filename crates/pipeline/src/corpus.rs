//! The document corpus: the one piece of state shared between query handling,
//! user add/remove, and background enrichment.
//!
//! Mutations go through [`CorpusHandle`], which hands out cloned snapshots
//! for reads and applies targeted patch-by-id writes for enrichment
//! completions, so concurrent completions for different documents do not
//! interfere. Concurrent add/remove of the same document is the caller's to
//! serialize.

use crate::types::{DocumentInfo, DocumentMetadata};
use chrono::{DateTime, Utc};
use dossier_core::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Neutral hint handed to the selector when no description is usable.
pub const NO_DESCRIPTION_HINT: &str = "No description available.";

/// User-visible sentinel for a description that could not be generated.
pub const FAILED_DESCRIPTION_LABEL: &str = "Failed to load description.";

/// Tri-state lifecycle of a document description.
///
/// A document starts `Pending` the moment it is added; the enricher later
/// moves it to `Ready` or `Failed`. The selector treats `Pending` and
/// `Failed` as degraded-but-present hints, never as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionState {
    /// Enrichment has not completed yet
    Pending,

    /// Enrichment produced a description
    Ready(String),

    /// Enrichment failed; never left pending indefinitely
    Failed,
}

impl DescriptionState {
    /// Best-available retrieval hint for the selector prompt.
    pub fn hint(&self) -> &str {
        match self {
            DescriptionState::Ready(text) if !text.trim().is_empty() => text,
            _ => NO_DESCRIPTION_HINT,
        }
    }

    /// User-visible label for document listings.
    pub fn label(&self) -> &str {
        match self {
            DescriptionState::Pending => "...",
            DescriptionState::Ready(text) => text,
            DescriptionState::Failed => FAILED_DESCRIPTION_LABEL,
        }
    }
}

/// One uploaded document.
///
/// Created on upload with parsed plain-text content; the pipeline never
/// mutates it. Only the enricher fills in description, title and date.
#[derive(Debug, Clone)]
pub struct Document {
    /// Opaque unique id; enrichment patches are keyed by it
    pub id: String,

    /// Filename, unique within the corpus; the citation key
    pub name: String,

    /// Full plain-text content
    pub content: String,

    /// Enrichment-produced description
    pub description: DescriptionState,

    /// Enrichment-produced title
    pub title: Option<String>,

    /// Enrichment-produced date (YYYY-MM-DD)
    pub date: Option<String>,

    /// When the document was added
    pub added_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with a fresh id and a pending description.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            content: content.into(),
            description: DescriptionState::Pending,
            title: None,
            date: None,
            added_at: Utc::now(),
        }
    }

    /// The citation-bearing projection used by the map and reduce stages.
    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            name: self.name.clone(),
            title: self.title.clone(),
            date: self.date.clone(),
        }
    }
}

/// Insertion-ordered document set with unique names and a size cap.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    max_documents: usize,
}

impl Corpus {
    /// Create an empty corpus accepting at most `max_documents` documents.
    pub fn new(max_documents: usize) -> Self {
        Self {
            documents: Vec::new(),
            max_documents,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by id.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Document names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }

    /// Add a batch of documents.
    ///
    /// Documents whose name is already present are skipped. If the unique
    /// remainder would push the corpus past its cap, the whole batch is
    /// rejected.
    ///
    /// Returns the ids of the documents actually added, for enrichment
    /// scheduling.
    pub fn add_documents(&mut self, batch: Vec<Document>) -> AppResult<Vec<String>> {
        let unique: Vec<Document> = batch
            .into_iter()
            .filter(|doc| {
                let duplicate = self.documents.iter().any(|d| d.name == doc.name);
                if duplicate {
                    tracing::warn!(name = %doc.name, "Skipping document with duplicate name");
                }
                !duplicate
            })
            .collect();

        if self.documents.len() + unique.len() > self.max_documents {
            return Err(AppError::Corpus(format!(
                "You can only upload up to {} documents. Please remove some before adding more.",
                self.max_documents
            )));
        }

        let ids: Vec<String> = unique.iter().map(|d| d.id.clone()).collect();
        self.documents.extend(unique);
        Ok(ids)
    }

    /// Remove a document by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        self.documents.len() != before
    }

    /// Patch a document's description by id. A removed document is a no-op.
    pub fn set_description(&mut self, id: &str, state: DescriptionState) -> bool {
        match self.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.description = state;
                true
            }
            None => false,
        }
    }

    /// Patch a document's title/date by id. A removed document is a no-op.
    pub fn set_metadata(&mut self, id: &str, metadata: DocumentMetadata) -> bool {
        match self.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.title = metadata.title;
                doc.date = metadata.date;
                true
            }
            None => false,
        }
    }
}

/// Shared handle to the corpus.
///
/// Reads take a full snapshot; a query then works against immutable data
/// while enrichment completions keep patching the live corpus underneath.
#[derive(Clone)]
pub struct CorpusHandle {
    inner: Arc<RwLock<Corpus>>,
}

impl CorpusHandle {
    /// Create a handle over an empty corpus with the given cap.
    pub fn new(max_documents: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Corpus::new(max_documents))),
        }
    }

    /// Cloned snapshot of the current corpus.
    pub async fn snapshot(&self) -> Corpus {
        self.inner.read().await.clone()
    }

    /// Add a batch of documents; see [`Corpus::add_documents`].
    pub async fn add_documents(&self, batch: Vec<Document>) -> AppResult<Vec<String>> {
        self.inner.write().await.add_documents(batch)
    }

    /// Remove a document by id.
    pub async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.remove(id)
    }

    /// Patch a document's description by id.
    pub async fn set_description(&self, id: &str, state: DescriptionState) -> bool {
        self.inner.write().await.set_description(id, state)
    }

    /// Patch a document's title/date by id.
    pub async fn set_metadata(&self, id: &str, metadata: DocumentMetadata) -> bool {
        self.inner.write().await.set_metadata(id, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_skips_duplicate_names() {
        let mut corpus = Corpus::new(50);
        corpus
            .add_documents(vec![Document::new("a.pdf", "one")])
            .unwrap();

        let added = corpus
            .add_documents(vec![
                Document::new("a.pdf", "again"),
                Document::new("b.pdf", "two"),
            ])
            .unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.names(), vec!["a.pdf", "b.pdf"]);
        // The original content wins
        assert_eq!(corpus.documents()[0].content, "one");
    }

    #[test]
    fn test_add_rejects_batch_over_cap() {
        let mut corpus = Corpus::new(2);
        corpus
            .add_documents(vec![Document::new("a.pdf", ""), Document::new("b.pdf", "")])
            .unwrap();

        let err = corpus
            .add_documents(vec![Document::new("c.pdf", "")])
            .unwrap_err();
        assert!(matches!(err, AppError::Corpus(_)));
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_new_documents_start_pending() {
        let doc = Document::new("a.pdf", "content");
        assert_eq!(doc.description, DescriptionState::Pending);
        assert_eq!(doc.description.hint(), NO_DESCRIPTION_HINT);
        assert_eq!(doc.description.label(), "...");
    }

    #[test]
    fn test_description_states() {
        let ready = DescriptionState::Ready("Notes on X.".to_string());
        assert_eq!(ready.hint(), "Notes on X.");
        assert_eq!(ready.label(), "Notes on X.");

        let failed = DescriptionState::Failed;
        assert_eq!(failed.hint(), NO_DESCRIPTION_HINT);
        assert_eq!(failed.label(), FAILED_DESCRIPTION_LABEL);

        // A blank description is as useless as none
        let blank = DescriptionState::Ready("  ".to_string());
        assert_eq!(blank.hint(), NO_DESCRIPTION_HINT);
    }

    #[test]
    fn test_patch_by_id() {
        let mut corpus = Corpus::new(50);
        let ids = corpus
            .add_documents(vec![Document::new("a.pdf", ""), Document::new("b.pdf", "")])
            .unwrap();

        assert!(corpus.set_description(&ids[0], DescriptionState::Ready("Desc A.".into())));
        assert!(corpus.set_metadata(
            &ids[1],
            DocumentMetadata {
                title: Some("Report B".into()),
                date: Some("2024-03-01".into()),
            }
        ));

        assert_eq!(
            corpus.documents()[0].description,
            DescriptionState::Ready("Desc A.".into())
        );
        assert_eq!(corpus.documents()[1].title.as_deref(), Some("Report B"));
        assert_eq!(corpus.documents()[1].date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_patch_removed_document_is_noop() {
        let mut corpus = Corpus::new(50);
        let ids = corpus
            .add_documents(vec![Document::new("a.pdf", "")])
            .unwrap();

        assert!(corpus.remove(&ids[0]));
        assert!(!corpus.set_description(&ids[0], DescriptionState::Failed));
        assert!(!corpus.remove(&ids[0]));
    }

    #[tokio::test]
    async fn test_snapshot_isolated_from_later_patches() {
        let handle = CorpusHandle::new(50);
        let ids = handle
            .add_documents(vec![Document::new("a.pdf", "content")])
            .await
            .unwrap();

        let snapshot = handle.snapshot().await;
        handle
            .set_description(&ids[0], DescriptionState::Ready("Desc.".into()))
            .await;

        // The earlier snapshot still sees the pending state
        assert_eq!(
            snapshot.documents()[0].description,
            DescriptionState::Pending
        );
        assert_eq!(
            handle.snapshot().await.documents()[0].description,
            DescriptionState::Ready("Desc.".into())
        );
    }

    #[tokio::test]
    async fn test_concurrent_enrichment_patches_do_not_interfere() {
        let handle = CorpusHandle::new(50);
        let ids = handle
            .add_documents(vec![Document::new("a.pdf", ""), Document::new("b.pdf", "")])
            .await
            .unwrap();

        let h1 = {
            let handle = handle.clone();
            let id = ids[0].clone();
            tokio::spawn(async move {
                handle
                    .set_description(&id, DescriptionState::Ready("A.".into()))
                    .await
            })
        };
        let h2 = {
            let handle = handle.clone();
            let id = ids[1].clone();
            tokio::spawn(async move {
                handle
                    .set_description(&id, DescriptionState::Ready("B.".into()))
                    .await
            })
        };

        assert!(h1.await.unwrap());
        assert!(h2.await.unwrap());

        let corpus = handle.snapshot().await;
        assert_eq!(
            corpus.documents()[0].description,
            DescriptionState::Ready("A.".into())
        );
        assert_eq!(
            corpus.documents()[1].description,
            DescriptionState::Ready("B.".into())
        );
    }
}
