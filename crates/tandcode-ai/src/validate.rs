//! Validation and correction of model-proposed codes.
//!
//! The model's code is a starting point only. Wherever the note or the model's
//! own fields carry countable evidence (restored surfaces, treated canals,
//! minutes of cleaning) the code or quantity is re-derived from it, and every
//! change is recorded on the suggestion so a reviewer can see what happened.

use tandcode_core::shorthand::{
    count_surfaces, extract_canal_count, extract_minutes, extract_surface_count, extract_surfaces,
};
use tandcode_core::tooth::{default_canal_count, is_valid_fdi};
use tandcode_core::{Catalog, Confidence, RawSuggestion, ValidatedSuggestion, normalize_code};
use tracing::{debug, warn};

use crate::codes::{CLEANING, CLEANING_UNIT_MINUTES, FillingFamily, endo_code_for, is_endodontic};
use crate::companions::is_companion_code;
use crate::dedup::dedup;

/// Validate raw candidates against `text` (the clinician's note) and the
/// catalog. Unknown codes are dropped; survivors are deduplicated, first wins.
pub fn validate(raw: &[RawSuggestion], text: &str, catalog: &Catalog) -> Vec<ValidatedSuggestion> {
    let validated = raw
        .iter()
        .filter_map(|candidate| validate_one(candidate, text, catalog))
        .collect();
    dedup(validated)
}

fn validate_one(raw: &RawSuggestion, text: &str, catalog: &Catalog) -> Option<ValidatedSuggestion> {
    let original_code = normalize_code(&raw.code);
    let mut code = original_code.clone();
    let mut quantity = raw.quantity.max(1);
    let mut corrections = Vec::new();

    let mut tooth_numbers: Vec<u8> = Vec::new();
    for &t in &raw.tooth_numbers {
        if is_valid_fdi(t) && !tooth_numbers.contains(&t) {
            tooth_numbers.push(t);
        }
    }

    if let Some(family) = FillingFamily::of(&code)
        && let Some(surfaces) = surface_count(raw, text)
        && let Some(derived) = family.code_for(surfaces)
        && derived != code
    {
        corrections.push(format!(
            "{code} → {derived}: {surfaces} surface(s), {} filling",
            family.as_str()
        ));
        code = derived.to_string();
    }

    if is_endodontic(&code)
        && let Some(canals) = canal_count(raw, text, &tooth_numbers)
        && let Some(derived) = endo_code_for(canals)
        && derived != code
    {
        corrections.push(format!("{code} → {derived}: {canals} canal(s)"));
        code = derived.to_string();
    }

    if code == CLEANING
        && let Some(minutes) = extract_minutes(text)
    {
        let units = minutes.div_ceil(CLEANING_UNIT_MINUTES).max(1);
        if units != quantity {
            corrections.push(format!(
                "{code} quantity {quantity} → {units}: \
                 {minutes} min at {CLEANING_UNIT_MINUTES} min per unit"
            ));
            quantity = units;
        }
    }

    let Some(entry) = catalog.get(&code) else {
        warn!(
            original = %original_code,
            code = %code,
            "dropping suggestion: code not in catalog"
        );
        return None;
    };

    for note in &corrections {
        debug!(original = %original_code, code = %code, note = %note, "corrected suggestion");
    }

    let is_companion =
        raw.is_companion && (is_companion_code(&code) || catalog.is_declared_companion(&code));

    let confidence = if corrections.is_empty() && (is_companion || entry.keyword_in(text)) {
        Confidence::High
    } else {
        Confidence::Medium
    };

    let description = if raw.description.trim().is_empty() {
        entry.description.clone()
    } else {
        raw.description.clone()
    };

    Some(ValidatedSuggestion {
        code,
        original_code,
        description,
        tooth_numbers,
        quantity,
        reasoning: raw.reasoning.clone(),
        is_companion,
        confidence,
        corrected: !corrections.is_empty(),
        corrections,
    })
}

/// Restored surfaces: model's letters, then letters in the note, then an
/// explicit count like "3 vlakken". Counts outside 1..=6 are skipped.
fn surface_count(raw: &RawSuggestion, text: &str) -> Option<usize> {
    let in_range = |n: &usize| (1..=6).contains(n);
    raw.surfaces
        .as_deref()
        .map(count_surfaces)
        .filter(in_range)
        .or_else(|| extract_surfaces(text).map(|s| count_surfaces(&s)).filter(in_range))
        .or_else(|| extract_surface_count(text).map(usize::from).filter(in_range))
}

/// Treated canals: model's count, then the note, then the first tooth's
/// typical anatomy. Counts outside 1..=5 are skipped.
fn canal_count(raw: &RawSuggestion, text: &str, teeth: &[u8]) -> Option<u8> {
    let in_range = |n: &u8| (1..=5).contains(n);
    raw.canals
        .filter(in_range)
        .or_else(|| extract_canal_count(text).filter(in_range))
        .or_else(|| teeth.first().copied().and_then(default_canal_count))
}
