use std::collections::HashSet;

use tandcode_core::ValidatedSuggestion;
use tracing::debug;

/// Collapse suggestions sharing a code and tooth set. The first occurrence
/// wins and order is otherwise preserved.
pub fn dedup(suggestions: Vec<ValidatedSuggestion>) -> Vec<ValidatedSuggestion> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| {
            let key = s.dedup_key();
            let fresh = seen.insert(key);
            if !fresh {
                debug!(code = %s.code, "duplicate suggestion dropped");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::validated;

    #[test]
    fn tooth_order_does_not_matter() {
        let out = dedup(vec![
            validated("H11", &[38, 48]),
            validated("H11", &[48, 38]),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tooth_numbers, vec![38, 48]);
    }

    #[test]
    fn first_wins() {
        let mut first = validated("A10", &[]);
        first.reasoning = "first".into();
        let mut second = validated("A10", &[]);
        second.reasoning = "second".into();
        let out = dedup(vec![first, second]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].reasoning, "first");
    }

    #[test]
    fn different_teeth_are_kept() {
        let out = dedup(vec![
            validated("V93", &[36]),
            validated("V93", &[37]),
            validated("V93", &[]),
        ]);
        assert_eq!(out.len(), 3);
    }
}
