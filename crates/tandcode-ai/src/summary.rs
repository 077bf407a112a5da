//! One-sentence confirmation of the recognized codes.
//!
//! Best effort: any failure of the second model call falls back to a
//! template built from the suggestion list.

use std::time::Duration;

use tandcode_core::ValidatedSuggestion;
use tandcode_llm::{GenerateRequest, TextGenerator};
use tracing::{debug, warn};

const SUMMARY_PROMPT: &str = "\
You confirm treatment codes to a dentist. Write exactly one short sentence \
in the dentist's language that names the recognized treatments. No lists, \
no markdown.";

/// Template sentence used whenever the model cannot provide one.
pub fn fallback_summary(suggestions: &[ValidatedSuggestion]) -> String {
    let codes: Vec<&str> = suggestions.iter().map(|s| s.code.as_str()).collect();
    format!(
        "Recognized {} treatment code(s): {}.",
        suggestions.len(),
        codes.join(", ")
    )
}

/// Ask `generator` for a summary sentence, bounded by `timeout`.
///
/// Never fails. An empty list does not call the model at all.
pub async fn compose_summary(
    generator: &dyn TextGenerator,
    message: &str,
    suggestions: &[ValidatedSuggestion],
    timeout: Duration,
) -> String {
    if suggestions.is_empty() {
        return fallback_summary(suggestions);
    }

    let lines: Vec<String> = suggestions
        .iter()
        .map(|s| {
            let teeth: Vec<String> = s.tooth_numbers.iter().map(|t| t.to_string()).collect();
            format!(
                "- {} {} (teeth: {}, quantity: {})",
                s.code,
                s.description,
                if teeth.is_empty() { "-".to_string() } else { teeth.join(",") },
                s.quantity
            )
        })
        .collect();

    let request = GenerateRequest {
        system_prompt: Some(SUMMARY_PROMPT.to_string()),
        user_prompt: format!("Note: {message}\n\nCodes:\n{}", lines.join("\n")),
        max_tokens: 200,
        temperature: 0.3,
    };

    match tokio::time::timeout(timeout, generator.generate(&request)).await {
        Ok(Ok(generated)) => {
            let sentence = generated.text.trim();
            if sentence.is_empty() {
                warn!("summary empty, using fallback");
                fallback_summary(suggestions)
            } else {
                debug!(tokens = generated.tokens_used, "summary composed");
                sentence.to_string()
            }
        }
        Ok(Err(e)) => {
            warn!(error = %e, "summary failed, using fallback");
            fallback_summary(suggestions)
        }
        Err(_) => {
            warn!(timeout = ?timeout, "summary timed out, using fallback");
            fallback_summary(suggestions)
        }
    }
}
