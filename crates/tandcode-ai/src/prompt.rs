//! Instruction payload for the coding call.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use tandcode_core::{Catalog, CatalogEntry, Category};

use crate::request::{CodingRequest, PROMPT_HISTORY_TURNS};

const SYSTEM_PROMPT: &str = "\
You are a billing assistant for a Dutch dental practice. You translate a \
clinician's free-text shorthand into treatment codes from the catalog below.

Respond ONLY with a JSON array. No markdown fences, no explanation, just raw JSON:
[
  {
    \"code\": \"catalog code, e.g. V93\",
    \"description\": \"catalog description\",
    \"tooth_numbers\": [36],
    \"surfaces\": \"restored surfaces as letters, e.g. MOD\" or null,
    \"canals\": number of treated root canals or null,
    \"quantity\": 1,
    \"reasoning\": \"which words in the note support this code\",
    \"is_companion\": false
  }
]

Conventions:
- Teeth use FDI two-digit numbering: 11-48 permanent, 51-85 primary.
- Surfaces: M mesial, O occlusal, D distal, B buccal, L lingual, P palatal, \
I incisal, V vestibular. Count each surface once.
- Only use codes listed in the catalog. Never invent codes.
- Set is_companion to true for codes billed only because of another procedure \
(e.g. anesthesia for a filling).
- If the note describes no billable treatment, return [].";

/// Everything the prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub request: &'a CodingRequest,
    pub categories: &'a BTreeSet<Category>,
    pub catalog: &'a Catalog,
}

/// System and user prompt for one coding call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub fn build_prompt(input: PromptInput<'_>) -> Prompt {
    let mut system = String::from(SYSTEM_PROMPT);
    system.push_str("\n\nCatalog:\n");
    for entry in input.catalog.in_categories(input.categories) {
        push_entry(&mut system, entry);
    }

    Prompt {
        system,
        user: build_user_prompt(input.request),
    }
}

fn push_entry(out: &mut String, entry: &CatalogEntry) {
    let _ = write!(
        out,
        "- {code} [{category}] {description} (EUR {tariff})",
        code = entry.code,
        category = entry.category,
        description = entry.description,
        tariff = entry.tariff,
    );
    if entry.requires_tooth {
        out.push_str(" per tooth");
    }
    if entry.requires_surface {
        out.push_str(", needs surfaces");
    }
    if !entry.keywords.is_empty() {
        let _ = write!(out, "; keywords: {}", entry.keywords.join(", "));
    }
    if !entry.examples.is_empty() {
        let _ = write!(out, "; examples: {}", entry.examples.join(" | "));
    }
    if !entry.companions.is_empty() {
        let _ = write!(out, "; usually with: {}", entry.companions.join(", "));
    }
    out.push('\n');
}

fn build_user_prompt(request: &CodingRequest) -> String {
    let mut out = String::new();

    let history = request.recent_history(PROMPT_HISTORY_TURNS);
    if !history.is_empty() {
        out.push_str("Conversation so far:\n");
        for turn in history {
            let _ = writeln!(out, "{}: {}", turn.role, turn.content);
        }
        out.push('\n');
    }

    let teeth = &request.context.selected_teeth;
    if !teeth.is_empty() {
        let joined: Vec<String> = teeth.iter().map(|t| t.to_string()).collect();
        let _ = writeln!(out, "Selected teeth: {}\n", joined.join(", "));
    }

    let _ = write!(out, "Note:\n{}", request.message);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Turn;
    use crate::testing::fixture_catalog;

    #[test]
    fn catalog_excerpt_limited_to_categories() {
        let catalog = fixture_catalog();
        let request = CodingRequest::new("comp 36 MOD");
        let categories = BTreeSet::from([Category::Fillings, Category::Anesthesia]);
        let prompt = build_prompt(PromptInput {
            request: &request,
            categories: &categories,
            catalog: &catalog,
        });

        assert!(prompt.system.contains("- V93 [fillings]"));
        assert!(prompt.system.contains("- A10 [anesthesia]"));
        assert!(prompt.system.contains("usually with: A10"));
        assert!(!prompt.system.contains("- E16"));
        assert!(!prompt.system.contains("- M03"));
        assert!(prompt.user.ends_with("Note:\ncomp 36 MOD"));
    }

    #[test]
    fn user_prompt_carries_history_and_teeth() {
        let catalog = fixture_catalog();
        let history = (1..=8).map(|i| Turn::user(format!("turn {i}"))).collect();
        let request = CodingRequest::new("wkb")
            .with_history(history)
            .with_selected_teeth(&[36, 37]);
        let categories = BTreeSet::from([Category::Endodontics]);
        let prompt = build_prompt(PromptInput {
            request: &request,
            categories: &categories,
            catalog: &catalog,
        });

        assert!(!prompt.user.contains("turn 2\n"));
        assert!(prompt.user.contains("user: turn 3\n"));
        assert!(prompt.user.contains("user: turn 8\n"));
        assert!(prompt.user.contains("Selected teeth: 36, 37"));
    }

    #[test]
    fn no_history_section_when_empty() {
        let catalog = fixture_catalog();
        let request = CodingRequest::new("extractie 48");
        let categories = BTreeSet::from([Category::Extraction]);
        let prompt = build_prompt(PromptInput {
            request: &request,
            categories: &categories,
            catalog: &catalog,
        });
        assert_eq!(prompt.user, "Note:\nextractie 48");
    }
}
