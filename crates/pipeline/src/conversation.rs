//! The conversation log: committed turns plus one transient status slot.
//!
//! The status slot models the interim "working" message a caller shows while
//! a query is in flight. It is distinct from committed turns and swapped
//! atomically: committing a turn clears it, so at most one status exists at
//! any time and none survives a terminal state.

use crate::types::SummaryResult;
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One committed conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Opaque unique id
    pub id: String,

    pub sender: Sender,

    /// Markdown text shown to the user
    pub text: String,

    /// Document names backing the turn, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    /// Summary payload, for summary turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
}

impl Turn {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            sources: Vec::new(),
            summary: None,
        }
    }

    /// A turn sent by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// A turn produced by the pipeline.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    /// Attach source document names.
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Attach a summary payload.
    pub fn with_summary(mut self, summary: SummaryResult) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Append-only turn log with a dedicated transient-status slot.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    status: Option<String>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent committed turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The transient status text, if a query is mid-flight.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Append a turn without touching the status slot.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Set or replace the transient status.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(text.into());
    }

    /// Drop the transient status.
    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Atomically replace the transient status with a committed turn.
    pub fn commit(&mut self, turn: Turn) {
        self.status = None;
        self.turns.push(turn);
    }
}
