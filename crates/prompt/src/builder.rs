//! Prompt rendering and document-block formatting.

use dossier_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Render a Handlebars template with variables.
///
/// HTML escaping is disabled: prompts are plain text and document content
/// must reach the model verbatim.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Other(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Other(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

/// Format one document's payload inside explicit delimiters.
///
/// Every multi-document prompt in the pipeline separates documents with
/// these markers so the model can attribute content to a filename.
pub fn document_block(name: &str, body: &str) -> String {
    format!(
        "--- DOCUMENT START: {name} ---\n{body}\n--- DOCUMENT END: {name} ---",
        name = name,
        body = body
    )
}

/// Join several document blocks into one context string.
pub fn join_blocks(blocks: &[String]) -> String {
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_variables() {
        let rendered = render_template(
            "Question: {{query}} ({{max_selected}} max)",
            &vars(&[("query", "what is X"), ("max_selected", "30")]),
        )
        .unwrap();
        assert_eq!(rendered, "Question: what is X (30 max)");
    }

    #[test]
    fn test_render_does_not_escape_content() {
        let rendered = render_template(
            "{{content}}",
            &vars(&[("content", "a < b && c > \"d\"")]),
        )
        .unwrap();
        assert_eq!(rendered, "a < b && c > \"d\"");
    }

    #[test]
    fn test_document_block_delimiters() {
        let block = document_block("report.pdf", "body text");
        assert!(block.starts_with("--- DOCUMENT START: report.pdf ---"));
        assert!(block.ends_with("--- DOCUMENT END: report.pdf ---"));
        assert!(block.contains("body text"));
    }

    #[test]
    fn test_join_blocks_blank_line_separated() {
        let joined = join_blocks(&[
            document_block("a.txt", "one"),
            document_block("b.txt", "two"),
        ]);
        assert!(joined.contains("--- DOCUMENT END: a.txt ---\n\n--- DOCUMENT START: b.txt ---"));
    }

    #[test]
    fn test_selector_template_renders() {
        let rendered = render_template(
            templates::SELECTOR_USER,
            &vars(&[
                ("catalog", "- a.pdf: Notes on X."),
                ("query", "what is X"),
                ("max_selected", "30"),
            ]),
        )
        .unwrap();
        assert!(rendered.contains("- a.pdf: Notes on X."));
        assert!(rendered.contains("\"what is X\""));
        assert!(rendered.contains("at most 30"));
    }
}
