//! Mutually exclusive code pairs.

use tandcode_core::ValidatedSuggestion;
use tracing::debug;

use crate::codes::{
    LOCAL_ANESTHESIA, PANORAMIC_XRAY, PERIODIC_CHECKUP, PROBLEM_CONSULT, SMALL_XRAY,
    TOPICAL_ANESTHESIA,
};

/// `(first, second)`: when both are billed, a companion-flagged `second`
/// gives way to `first`.
pub const EXCLUSIVE_PAIRS: &[(&str, &str)] = &[
    (TOPICAL_ANESTHESIA, LOCAL_ANESTHESIA),
    (PANORAMIC_XRAY, SMALL_XRAY),
    (PERIODIC_CHECKUP, PROBLEM_CONSULT),
];

/// Remove companion-flagged codes excluded by a present partner. Main
/// procedures chosen by the clinician are never removed.
pub fn apply_exclusions(suggestions: Vec<ValidatedSuggestion>) -> Vec<ValidatedSuggestion> {
    let excluded: Vec<&str> = EXCLUSIVE_PAIRS
        .iter()
        .filter(|(first, second)| {
            suggestions.iter().any(|s| s.code == *first)
                && suggestions.iter().any(|s| s.code == *second)
        })
        .map(|(_, second)| *second)
        .collect();

    if excluded.is_empty() {
        return suggestions;
    }

    suggestions
        .into_iter()
        .filter(|s| {
            let drop = s.is_companion && excluded.contains(&s.code.as_str());
            if drop {
                debug!(code = %s.code, "companion removed by exclusion");
            }
            !drop
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::validated;

    fn companion(code: &str) -> ValidatedSuggestion {
        let mut s = validated(code, &[]);
        s.is_companion = true;
        s
    }

    #[test]
    fn topical_removes_companion_local() {
        let out = apply_exclusions(vec![
            validated("V91", &[51]),
            validated("A15", &[]),
            companion("A10"),
        ]);
        let codes: Vec<_> = out.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["V91", "A15"]);
    }

    #[test]
    fn main_choice_is_never_removed() {
        let out = apply_exclusions(vec![validated("A15", &[]), validated("A10", &[36])]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn panoramic_removes_companion_small_xray() {
        let out = apply_exclusions(vec![
            validated("E16", &[36]),
            validated("X21", &[]),
            companion("A10"),
            companion("X10"),
        ]);
        let codes: Vec<_> = out.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["E16", "X21", "A10"]);
    }

    #[test]
    fn checkup_removes_companion_problem_consult() {
        let out = apply_exclusions(vec![
            validated("C002", &[]),
            validated("M03", &[]),
            companion("C003"),
        ]);
        let codes: Vec<_> = out.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["C002", "M03"]);

        let out = apply_exclusions(vec![validated("C002", &[]), validated("C003", &[])]);
        let codes: Vec<_> = out.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["C002", "C003"]);
    }

    #[test]
    fn lone_member_is_kept() {
        let out = apply_exclusions(vec![companion("A10"), companion("X10")]);
        assert_eq!(out.len(), 2);
    }
}
