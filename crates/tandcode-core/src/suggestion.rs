//! Code suggestions as they move through the coding pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CatalogEntry;

/// A candidate code as proposed by the language model, after field
/// sanitization but before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSuggestion {
    /// May be unknown to the catalog.
    pub code: String,
    pub description: String,
    pub tooth_numbers: Vec<u8>,
    pub surfaces: Option<String>,
    pub canals: Option<u8>,
    pub quantity: u32,
    pub reasoning: String,
    /// The model's own claim; confirmed during validation.
    pub is_companion: bool,
}

impl RawSuggestion {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            tooth_numbers: Vec::new(),
            surfaces: None,
            canals: None,
            quantity: 1,
            reasoning: String::new(),
            is_companion: false,
        }
    }

    pub fn with_teeth(mut self, teeth: &[u8]) -> Self {
        self.tooth_numbers = teeth.to_vec();
        self
    }
}

/// Trust estimate for a suggested code. Not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

/// A suggestion whose code is known to exist in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedSuggestion {
    pub code: String,
    /// The code as proposed, before any correction.
    pub original_code: String,
    pub description: String,
    pub tooth_numbers: Vec<u8>,
    pub quantity: u32,
    pub reasoning: String,
    pub is_companion: bool,
    pub confidence: Confidence,
    pub corrected: bool,
    /// Human-readable change notes, in the order they were applied.
    pub corrections: Vec<String>,
}

impl ValidatedSuggestion {
    /// Identity used for deduplication: code plus sorted tooth numbers.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.code, &self.tooth_numbers)
    }
}

/// Build the `(code, sorted tooth set)` identity; `-` stands for "no teeth".
pub fn dedup_key(code: &str, teeth: &[u8]) -> String {
    if teeth.is_empty() {
        return format!("{code}|-");
    }
    let mut sorted = teeth.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let joined: Vec<String> = sorted.iter().map(|t| t.to_string()).collect();
    format!("{code}|{}", joined.join(","))
}

/// Feeding a processed suggestion back into validation.
impl From<&ValidatedSuggestion> for RawSuggestion {
    fn from(v: &ValidatedSuggestion) -> Self {
        Self {
            code: v.code.clone(),
            description: v.description.clone(),
            tooth_numbers: v.tooth_numbers.clone(),
            surfaces: None,
            canals: None,
            quantity: v.quantity,
            reasoning: v.reasoning.clone(),
            is_companion: v.is_companion,
        }
    }
}

/// Final suggestion handed to the UI for one-click acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedSuggestion {
    /// Opaque per-item id.
    pub id: Uuid,
    #[serde(flatten)]
    pub suggestion: ValidatedSuggestion,
    pub tariff: Decimal,
    /// `tariff × quantity`.
    pub line_total: Decimal,
}

impl EnrichedSuggestion {
    /// Attach catalog description and pricing to a validated suggestion.
    pub fn from_catalog(mut suggestion: ValidatedSuggestion, entry: &CatalogEntry) -> Self {
        suggestion.description = entry.description.clone();
        let line_total = entry.tariff * Decimal::from(suggestion.quantity);
        Self {
            id: Uuid::new_v4(),
            suggestion,
            tariff: entry.tariff,
            line_total,
        }
    }
}
