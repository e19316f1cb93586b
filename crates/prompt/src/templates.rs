//! Prompt templates for every pipeline stage.
//!
//! Templates use Handlebars syntax and are rendered by
//! [`crate::builder::render_template`]. The schema-constrained stages
//! (selection, synthesis, summary, metadata) instruct the model to answer
//! with a single JSON object; the plain-text stages (extraction,
//! description) expect trimmed text.

/// System instruction for the retrieval stage.
pub const SELECTOR_SYSTEM: &str = "You are a research librarian for a document collection. \
Given a user's question and a catalog of document names with short descriptions, identify \
which documents are worth reading in full to answer the question. Return only names that \
appear in the catalog. If no document looks relevant, return an empty list. Your entire \
response must be a single JSON object matching the provided schema.";

/// User prompt for the retrieval stage.
///
/// Variables: `catalog`, `query`, `max_selected`.
pub const SELECTOR_USER: &str = "Document catalog:\n{{catalog}}\n\n\
User's question: \"{{query}}\"\n\n\
Select the documents worth reading in full (at most {{max_selected}}).";

/// System instruction for the per-document extraction stage.
pub const EXTRACTOR_SYSTEM: &str = "You are an analyst reading a single document on behalf \
of a researcher. Extract the key points that are strictly relevant to the researcher's \
question, staying close to the document's own wording. If the document contains nothing \
relevant to the question, respond with an empty message and nothing else. Do not use \
external knowledge.";

/// User prompt for the per-document extraction stage.
///
/// Variables: `name`, `content`, `query`.
pub const EXTRACTOR_USER: &str = "--- DOCUMENT START: {{name}} ---\n{{content}}\n\
--- DOCUMENT END: {{name}} ---\n\n\
Researcher's question: \"{{query}}\"\n\n\
Key points strictly relevant to the question (or an empty response if there are none):";

/// System instruction for the synthesis stage.
pub const SYNTHESIZER_SYSTEM: &str = "You are an expert AI assistant specializing in \
analyzing a collection of documents. You have been provided with key points extracted from \
several documents. Your task is to answer the user's question based *only* on these points.\n\n\
When you formulate your answer, you MUST follow these rules:\n\
1. Synthesize information across the provided documents to give a comprehensive answer in Markdown.\n\
2. Cite the source of every claim inline, identifying the document's title, filename, and date where available.\n\
3. List in 'sources' the filenames of only the documents you actually drew upon, not every document provided.\n\
4. If the provided points are insufficient to answer the question, explicitly say so in the 'answer' field and leave 'sources' empty. Do not use external knowledge and do not invent citations.\n\
5. Your entire response must be a single JSON object matching the provided schema. Do not add any text or markdown formatting outside of the JSON object.";

/// User prompt for the synthesis stage.
///
/// Variables: `context`, `query`.
pub const SYNTHESIZER_USER: &str = "{{context}}\n\nUser's question: \"{{query}}\"\n\nJSON Response:";

/// System instruction for the cross-document summary.
pub const SUMMARY_SYSTEM: &str = "You are an expert AI assistant. You have been provided \
with several documents. Your task is to generate a summary and extract key entities. You \
must identify all countries and key stakeholders mentioned. Your entire response must be a \
single JSON object matching the provided schema.";

/// User prompt for the cross-document summary.
///
/// Variables: `context`.
pub const SUMMARY_USER: &str = "Please provide a summary, a list of countries, and a list \
of stakeholders for the following documents:\n\n{{context}}";

/// Prompt for generating a one-sentence document description.
///
/// Variables: `content`.
pub const DESCRIPTION_PROMPT: &str = "Briefly describe the purpose or main topic of the \
following document in a single, concise sentence.\n\nDOCUMENT CONTENT:\n{{content}}";

/// Prompt for extracting title/date metadata from a document excerpt.
///
/// Variables: `content`.
pub const METADATA_PROMPT: &str = "Extract the title and the publication date of the \
following document excerpt. Use \"N/A\" when the document does not state a value. The date \
must be in YYYY-MM-DD format or \"N/A\". Your entire response must be a single JSON object \
matching the provided schema.\n\nDOCUMENT EXCERPT:\n{{content}}";
