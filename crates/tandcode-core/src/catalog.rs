//! Read-only billing-code reference catalog.
//!
//! The catalog is produced elsewhere and consumed here as JSON. It is loaded
//! once, validated, and then shared (`Arc<Catalog>`) across requests. Every
//! lookup is a pure read keyed by the normalized (trimmed, uppercase) code.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;

/// Clinical domain grouping of catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Consultation,
    Prevention,
    Fillings,
    Endodontics,
    Extraction,
    CrownBridge,
    Prosthetics,
    Anesthesia,
    Radiography,
    Surgery,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Consultation,
        Self::Prevention,
        Self::Fillings,
        Self::Endodontics,
        Self::Extraction,
        Self::CrownBridge,
        Self::Prosthetics,
        Self::Anesthesia,
        Self::Radiography,
        Self::Surgery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consultation => "consultation",
            Self::Prevention => "prevention",
            Self::Fillings => "fillings",
            Self::Endodontics => "endodontics",
            Self::Extraction => "extraction",
            Self::CrownBridge => "crown_bridge",
            Self::Prosthetics => "prosthetics",
            Self::Anesthesia => "anesthesia",
            Self::Radiography => "radiography",
            Self::Surgery => "surgery",
        }
    }

    /// Invasive procedures are normally performed under local anesthesia.
    pub fn is_invasive(&self) -> bool {
        matches!(
            self,
            Self::Fillings
                | Self::Endodontics
                | Self::Extraction
                | Self::CrownBridge
                | Self::Surgery
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single billable code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub description: String,
    pub tariff: Decimal,
    pub category: Category,
    #[serde(default)]
    pub requires_tooth: bool,
    #[serde(default)]
    pub requires_surface: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Worked shorthand examples, shown to the LLM.
    #[serde(default)]
    pub examples: Vec<String>,
    /// Codes conventionally billed alongside this one.
    #[serde(default)]
    pub companions: Vec<String>,
}

impl CatalogEntry {
    /// True when any keyword occurs (case-insensitively) in `text`.
    pub fn keyword_in(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && lower.contains(&k))
    }
}

/// Accepted catalog document shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Entries(Vec<CatalogEntry>),
    Wrapped { entries: Vec<CatalogEntry> },
}

/// Immutable code catalog.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_code: HashMap<String, usize>,
}

/// Summary statistics for a catalog.
pub struct CatalogSummary {
    pub total_entries: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub with_keywords: usize,
    pub with_companions: usize,
    pub requiring_tooth: usize,
}

/// Normalize a code for lookup: trimmed, uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl Catalog {
    /// Build a catalog from entries, rejecting empty input, blank or
    /// duplicate codes, and negative tariffs.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_code = HashMap::with_capacity(entries.len());
        let mut normalized = Vec::with_capacity(entries.len());
        for (idx, mut entry) in entries.into_iter().enumerate() {
            let code = normalize_code(&entry.code);
            if code.is_empty() {
                return Err(CatalogError::EmptyCode);
            }
            if entry.tariff.is_sign_negative() {
                return Err(CatalogError::NegativeTariff(code));
            }
            if by_code.insert(code.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateCode(code));
            }
            entry.code = code;
            entry.companions = entry.companions.iter().map(|c| normalize_code(c)).collect();
            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized,
            by_code,
        })
    }

    /// Parse a catalog from JSON: a bare array or `{ "entries": [...] }`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        let entries = match doc {
            CatalogDocument::Entries(e) => e,
            CatalogDocument::Wrapped { entries } => entries,
        };
        Self::from_entries(entries)
    }

    /// Load a catalog file from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!(path = %path.display(), entries = catalog.len(), "loaded code catalog");
        Ok(catalog)
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.by_code
            .get(&normalize_code(code))
            .map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(&normalize_code(code))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries belonging to any of `categories`, in catalog order.
    pub fn in_categories<'a>(
        &'a self,
        categories: &'a BTreeSet<Category>,
    ) -> impl Iterator<Item = &'a CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| categories.contains(&e.category))
    }

    /// True when some entry lists `code` as one of its companions.
    pub fn is_declared_companion(&self, code: &str) -> bool {
        let code = normalize_code(code);
        self.entries.iter().any(|e| e.companions.contains(&code))
    }

    /// Summary statistics.
    pub fn summary(&self) -> CatalogSummary {
        let mut per_category = BTreeMap::new();
        for entry in &self.entries {
            *per_category.entry(entry.category).or_insert(0) += 1;
        }

        CatalogSummary {
            total_entries: self.entries.len(),
            per_category,
            with_keywords: self.entries.iter().filter(|e| !e.keywords.is_empty()).count(),
            with_companions: self
                .entries
                .iter()
                .filter(|e| !e.companions.is_empty())
                .count(),
            requiring_tooth: self.entries.iter().filter(|e| e.requires_tooth).count(),
        }
    }
}
