//! Category pre-filter for the coding prompt.
//!
//! Matches free text against the [`TRIGGERS`] table to decide which catalog
//! categories the model gets to see. Layered on top of the raw matches:
//! invasive work pulls in anesthesia, consultation is always present, and a
//! selection that carries nothing beyond the forced categories widens to the
//! whole catalog (a bigger prompt beats missing a code whose vocabulary is
//! not in the table).

use std::collections::BTreeSet;

use tandcode_core::Category;
use tracing::debug;

use crate::triggers::{ALWAYS_INCLUDED, FORCED_ONLY_THRESHOLD, TRIGGERS};

/// How the final category set came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Built from trigger hits plus forced categories.
    Matched,
    /// Too little matched; every category is included.
    Widened,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Widened => "widened",
        }
    }
}

/// Classification result for one piece of text.
#[derive(Debug, Clone)]
pub struct CategorySelection {
    pub categories: BTreeSet<Category>,
    /// Trigger hits as `(category, trigger)`, in table order.
    pub hits: Vec<(Category, &'static str)>,
    pub mode: SelectionMode,
}

/// Categories relevant to `text`.
pub fn classify(text: &str) -> BTreeSet<Category> {
    classify_detailed(text).categories
}

/// Like [`classify`], also reporting which triggers fired.
pub fn classify_detailed(text: &str) -> CategorySelection {
    let lower = text.to_lowercase();

    let mut hits = Vec::new();
    for (category, triggers) in TRIGGERS {
        if let Some(trigger) = triggers.iter().find(|t| lower.contains(**t)) {
            hits.push((*category, *trigger));
        }
    }

    let mut categories: BTreeSet<Category> = hits.iter().map(|(c, _)| *c).collect();

    if categories.iter().any(|c| c.is_invasive()) {
        categories.insert(Category::Anesthesia);
    }
    categories.extend(ALWAYS_INCLUDED.iter().copied());

    let mode = if categories.len() <= FORCED_ONLY_THRESHOLD {
        categories = Category::ALL.into_iter().collect();
        SelectionMode::Widened
    } else {
        SelectionMode::Matched
    };

    debug!(
        hits = hits.len(),
        categories = categories.len(),
        mode = mode.as_str(),
        "classified text"
    );

    CategorySelection {
        categories,
        hits,
        mode,
    }
}
