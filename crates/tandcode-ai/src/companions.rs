//! Companion codes billed alongside a main procedure.
//!
//! A filling is rarely placed without local anesthesia, a root canal never
//! without a control x-ray. The rules below are keyed by the catalog
//! category of the main code and evaluated in table order, so the position
//! of a synthesized companion in the output is stable.

use std::collections::BTreeSet;

use tandcode_core::{Catalog, Category, Confidence, ValidatedSuggestion};
use tracing::debug;

use crate::codes::{LOCAL_ANESTHESIA, SMALL_XRAY};

/// Main-procedure category → companion codes, in insertion order.
pub const COMPANION_RULES: &[(Category, &[&str])] = &[
    (Category::Fillings, &[LOCAL_ANESTHESIA]),
    (Category::Endodontics, &[LOCAL_ANESTHESIA, SMALL_XRAY]),
    (Category::Extraction, &[LOCAL_ANESTHESIA]),
    (Category::CrownBridge, &[LOCAL_ANESTHESIA]),
    (Category::Surgery, &[LOCAL_ANESTHESIA]),
];

const AUTO_ADDED: &str = "Automatically added as a companion of the main procedure.";

/// True when some rule can inject `code` (already normalized).
pub fn is_companion_code(code: &str) -> bool {
    COMPANION_RULES
        .iter()
        .any(|(_, codes)| codes.contains(&code))
}

/// Companion suggestions missing from `suggestions`.
///
/// Only non-companion suggestions trigger rules. A companion is synthesized
/// once, and only when its code is neither present in the list nor absent
/// from the catalog.
pub fn derive_companions(
    suggestions: &[ValidatedSuggestion],
    catalog: &Catalog,
) -> Vec<ValidatedSuggestion> {
    let main_categories: BTreeSet<Category> = suggestions
        .iter()
        .filter(|s| !s.is_companion)
        .filter_map(|s| catalog.get(&s.code))
        .map(|e| e.category)
        .collect();

    let mut added: Vec<ValidatedSuggestion> = Vec::new();
    for (category, codes) in COMPANION_RULES {
        if !main_categories.contains(category) {
            continue;
        }
        for code in *codes {
            let present = suggestions.iter().any(|s| s.code == *code)
                || added.iter().any(|s| s.code == *code);
            if present {
                continue;
            }
            let Some(entry) = catalog.get(code) else {
                debug!(code = *code, "companion not in catalog, skipped");
                continue;
            };
            debug!(code = *code, trigger = category.as_str(), "adding companion");
            added.push(ValidatedSuggestion {
                code: entry.code.clone(),
                original_code: entry.code.clone(),
                description: entry.description.clone(),
                tooth_numbers: Vec::new(),
                quantity: 1,
                reasoning: AUTO_ADDED.to_string(),
                is_companion: true,
                confidence: Confidence::High,
                corrected: false,
                corrections: Vec::new(),
            });
        }
    }
    added
}

/// Append missing companions to `suggestions`.
pub fn apply_companions(
    mut suggestions: Vec<ValidatedSuggestion>,
    catalog: &Catalog,
) -> Vec<ValidatedSuggestion> {
    let companions = derive_companions(&suggestions, catalog);
    suggestions.extend(companions);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_catalog, validated};

    fn codes(list: &[ValidatedSuggestion]) -> Vec<&str> {
        list.iter().map(|s| s.code.as_str()).collect()
    }

    #[test]
    fn filling_gets_anesthesia() {
        let catalog = fixture_catalog();
        let out = apply_companions(vec![validated("V93", &[36])], &catalog);
        assert_eq!(codes(&out), vec!["V93", "A10"]);
        let a10 = &out[1];
        assert!(a10.is_companion);
        assert!(a10.tooth_numbers.is_empty());
        assert_eq!(a10.quantity, 1);
        assert_eq!(a10.confidence, Confidence::High);
    }

    #[test]
    fn endo_gets_anesthesia_then_xray() {
        let catalog = fixture_catalog();
        let out = apply_companions(vec![validated("E16", &[36])], &catalog);
        assert_eq!(codes(&out), vec!["E16", "A10", "X10"]);
    }

    #[test]
    fn companion_added_once_for_several_triggers() {
        let catalog = fixture_catalog();
        let out = apply_companions(
            vec![
                validated("V93", &[36]),
                validated("H11", &[48]),
                validated("E13", &[11]),
            ],
            &catalog,
        );
        assert_eq!(codes(&out), vec!["V93", "H11", "E13", "A10", "X10"]);
    }

    #[test]
    fn present_code_is_not_duplicated() {
        let catalog = fixture_catalog();
        let out = apply_companions(
            vec![validated("E16", &[36]), validated("X10", &[36])],
            &catalog,
        );
        assert_eq!(codes(&out), vec!["E16", "X10", "A10"]);
    }

    #[test]
    fn companions_do_not_trigger_rules() {
        let catalog = fixture_catalog();
        let mut a10 = validated("A10", &[]);
        a10.is_companion = true;
        let out = apply_companions(vec![a10], &catalog);
        assert_eq!(codes(&out), vec!["A10"]);
    }

    #[test]
    fn non_invasive_work_has_no_companions() {
        let catalog = fixture_catalog();
        let out = apply_companions(
            vec![validated("M03", &[]), validated("C002", &[])],
            &catalog,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn companion_codes_known() {
        assert!(is_companion_code("A10"));
        assert!(is_companion_code("X10"));
        assert!(!is_companion_code("V93"));
    }
}
