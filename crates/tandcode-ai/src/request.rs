//! Inbound request and outbound response of the coding pipeline.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tandcode_core::{Category, EnrichedSuggestion};

use crate::error::CodingError;

/// Turns of history fed to the classifier.
pub const CLASSIFIER_HISTORY_TURNS: usize = 4;
/// Turns of history fed to the prompt.
pub const PROMPT_HISTORY_TURNS: usize = 6;

/// One earlier turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Teeth selected in the chart UI.
    #[serde(default, alias = "selectedTeeth")]
    pub selected_teeth: Vec<u8>,
}

/// A clinician's note plus conversation history, most recent turn last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(default)]
    pub context: RequestContext,
}

impl CodingRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
            context: RequestContext::default(),
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_selected_teeth(mut self, teeth: &[u8]) -> Self {
        self.context.selected_teeth = teeth.to_vec();
        self
    }

    /// Reject messages with fewer than two non-whitespace characters.
    pub fn validate(&self) -> Result<(), CodingError> {
        let visible = self.message.chars().filter(|c| !c.is_whitespace()).count();
        if visible < 2 {
            return Err(CodingError::Input(
                "message must contain at least 2 non-whitespace characters".into(),
            ));
        }
        Ok(())
    }

    /// The last `n` history turns, oldest first.
    pub fn recent_history(&self, n: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Text the category classifier looks at: recent history plus message.
    pub fn classifier_text(&self) -> String {
        let mut parts: Vec<&str> = self
            .recent_history(CLASSIFIER_HISTORY_TURNS)
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        parts.push(&self.message);
        parts.join("\n")
    }
}

/// Pipeline output for one request.
#[derive(Debug, Clone, Serialize)]
pub struct CodingResponse {
    /// Summary sentence, or an explanation when nothing was detected.
    pub response: String,
    pub suggestions: Vec<EnrichedSuggestion>,
    /// Categories the prompt was restricted to.
    pub categories: BTreeSet<Category>,
    pub generated_at: DateTime<Utc>,
}
