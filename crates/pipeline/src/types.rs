//! Pipeline result types.

use serde::{Deserialize, Serialize};

/// Citation-bearing projection of a document.
///
/// Carried through the map stage so the synthesizer can attribute points to
/// a filename, title and date without dragging document content along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Filename; the sole citation identifier
    pub name: String,

    /// Title extracted during enrichment, if any
    pub title: Option<String>,

    /// Publication date (YYYY-MM-DD) extracted during enrichment, if any
    pub date: Option<String>,
}

/// Result of extracting query-relevant points from one document.
///
/// Ephemeral: produced by one extraction call, consumed immediately by the
/// synthesizer, never persisted. Empty points mean the document had nothing
/// relevant to the query and is excluded from synthesis.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The document the points were extracted from
    pub document: DocumentInfo,

    /// Query-relevant key points, possibly empty
    pub points: String,
}

impl ExtractionResult {
    /// An empty result for a document that yielded nothing (or whose
    /// extraction failed).
    pub fn empty(document: DocumentInfo) -> Self {
        Self {
            document,
            points: String::new(),
        }
    }

    /// Whether this result contributes nothing to synthesis.
    pub fn is_empty(&self) -> bool {
        self.points.trim().is_empty()
    }
}

/// The synthesized, cited answer to one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Markdown answer with inline citations
    pub answer: String,

    /// Names of the documents actually drawn upon; always a subset of the
    /// documents whose extractions were passed in
    pub sources: Vec<String>,
}

/// Cross-document summary with extracted entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Markdown summary across the whole corpus
    pub summary_text: String,

    /// Alphabetized distinct country names mentioned in the documents
    pub countries: Vec<String>,

    /// Distinct key stakeholders mentioned in the documents
    pub stakeholders: Vec<String>,
}

/// Title/date metadata extracted from a document during enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title, if the document states one
    pub title: Option<String>,

    /// Publication date in YYYY-MM-DD form, if the document states one
    pub date: Option<String>,
}
