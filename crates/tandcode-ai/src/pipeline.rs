//! Orchestration of one coding request.
//!
//! Classify → prompt → model → parse → validate → companions → exclusions →
//! dedup → summary → enrich. Only the two model calls are async; every other
//! stage is a pure function exposed by its own module.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tandcode_core::{Catalog, Category, EnrichedSuggestion, RawSuggestion, ValidatedSuggestion};
use tandcode_llm::{GenerateRequest, LlmError, TextGenerator};
use tracing::{info, warn};

use crate::classifier::classify;
use crate::companions::apply_companions;
use crate::dedup::dedup;
use crate::error::CodingError;
use crate::exclusions::apply_exclusions;
use crate::parser::parse;
use crate::prompt::{PromptInput, build_prompt};
use crate::request::{CodingRequest, CodingResponse};
use crate::summary::{compose_summary, fallback_summary};
use crate::validate::validate;

pub const NOTHING_DETECTED: &str = "No billable treatment was recognized in this note.";
pub const UNREADABLE_RESPONSE: &str =
    "The suggestion service gave an unreadable answer, so no codes were suggested. \
     Please rephrase the note or enter the codes manually.";
pub const NO_RESPONSE: &str =
    "The suggestion service did not answer in time, so no codes were suggested. \
     Please try again or enter the codes manually.";

/// Tuning for [`CodingPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub coding_timeout: Duration,
    pub summary_timeout: Duration,
    /// Ask the model for a summary sentence; otherwise use the template.
    pub summarize: bool,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            coding_timeout: Duration::from_secs(30),
            summary_timeout: Duration::from_secs(10),
            summarize: true,
            max_tokens: 2048,
            temperature: 0.0,
        }
    }
}

/// Coding pipeline bound to a catalog and a text generator.
pub struct CodingPipeline {
    catalog: Arc<Catalog>,
    generator: Arc<dyn TextGenerator>,
    config: PipelineConfig,
}

/// What the coding call produced.
enum Completion {
    Text(String),
    /// Timed out or came back without text.
    Unavailable,
}

impl CodingPipeline {
    pub fn new(catalog: Arc<Catalog>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            catalog,
            generator,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run the full pipeline for one request.
    ///
    /// Unreadable or late model output degrades to an empty suggestion list
    /// with an explanation; only invalid input, missing configuration and
    /// upstream failures are errors.
    pub async fn run(&self, request: &CodingRequest) -> Result<CodingResponse, CodingError> {
        request.validate()?;

        let categories = classify(&request.classifier_text());
        let prompt = build_prompt(PromptInput {
            request,
            categories: &categories,
            catalog: &self.catalog,
        });

        info!(
            model = self.generator.model(),
            categories = categories.len(),
            history = request.history.len(),
            "coding request"
        );

        let generate = GenerateRequest {
            system_prompt: Some(prompt.system),
            user_prompt: prompt.user,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let text = match self.complete(&generate).await? {
            Completion::Text(text) => text,
            Completion::Unavailable => return Ok(degraded(NO_RESPONSE, categories)),
        };

        let raw = match parse(&text) {
            Ok(raw) => raw,
            Err(failure) => {
                warn!(error = %failure, "model output could not be parsed");
                return Ok(degraded(UNREADABLE_RESPONSE, categories));
            }
        };

        let suggestions = postprocess(&raw, &request.message, &self.catalog);
        info!(
            proposed = raw.len(),
            accepted = suggestions.len(),
            corrected = suggestions.iter().filter(|s| s.corrected).count(),
            "coding complete"
        );

        let response = if suggestions.is_empty() {
            NOTHING_DETECTED.to_string()
        } else if self.config.summarize {
            compose_summary(
                self.generator.as_ref(),
                &request.message,
                &suggestions,
                self.config.summary_timeout,
            )
            .await
        } else {
            fallback_summary(&suggestions)
        };

        Ok(CodingResponse {
            response,
            suggestions: enrich(suggestions, &self.catalog),
            categories,
            generated_at: Utc::now(),
        })
    }

    async fn complete(&self, request: &GenerateRequest) -> Result<Completion, CodingError> {
        let timeout = self.config.coding_timeout;
        match tokio::time::timeout(timeout, self.generator.generate(request)).await {
            Ok(Ok(generated)) => Ok(Completion::Text(generated.text)),
            Ok(Err(LlmError::Timeout(after))) => {
                warn!(timeout = ?after, "coding call timed out");
                Ok(Completion::Unavailable)
            }
            Ok(Err(LlmError::EmptyResponse)) => {
                warn!("coding call returned no text");
                Ok(Completion::Unavailable)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!(timeout = ?timeout, "coding call timed out");
                Ok(Completion::Unavailable)
            }
        }
    }
}

/// Deterministic stages: validate → companions → exclusions → dedup.
///
/// Running this again on its own output (converted back to raw suggestions)
/// yields the same codes, teeth, quantities and companion flags. The second
/// run finds nothing left to correct, so correction notes are cleared,
/// `original_code` equals `code`, and confidence is re-derived from the note.
pub fn postprocess(
    raw: &[RawSuggestion],
    text: &str,
    catalog: &Catalog,
) -> Vec<ValidatedSuggestion> {
    let validated = validate(raw, text, catalog);
    let with_companions = apply_companions(validated, catalog);
    dedup(apply_exclusions(with_companions))
}

/// Attach catalog description, tariff and a per-item id.
pub fn enrich(suggestions: Vec<ValidatedSuggestion>, catalog: &Catalog) -> Vec<EnrichedSuggestion> {
    suggestions
        .into_iter()
        .filter_map(|s| {
            let entry = catalog.get(&s.code)?;
            Some(EnrichedSuggestion::from_catalog(s, entry))
        })
        .collect()
}

fn degraded(message: &str, categories: BTreeSet<Category>) -> CodingResponse {
    CodingResponse {
        response: message.to_string(),
        suggestions: Vec::new(),
        categories,
        generated_at: Utc::now(),
    }
}
