//! Prompt templates and rendering for the Dossier pipeline.
//!
//! Each pipeline stage owns a fixed instruction/template pair defined in
//! [`templates`]; [`builder`] renders templates with Handlebars and formats
//! the delimited per-document blocks every multi-document prompt uses.

pub mod builder;
pub mod templates;

pub use builder::{document_block, join_blocks, render_template};
