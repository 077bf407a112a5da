//! Clinical-procedure coding: from a clinician's shorthand note to validated,
//! priced treatment-code suggestions.
//!
//! The language model proposes; everything in this crate except the two
//! model calls in [`pipeline`] is deterministic and checks that proposal.

pub mod classifier;
pub mod codes;
pub mod companions;
pub mod dedup;
mod error;
pub mod exclusions;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod summary;
pub mod triggers;
pub mod validate;

pub use classifier::{CategorySelection, SelectionMode, classify, classify_detailed};
pub use error::CodingError;
pub use parser::{ParseFailure, parse};
pub use pipeline::{CodingPipeline, PipelineConfig, enrich, postprocess};
pub use request::{CodingRequest, CodingResponse, RequestContext, Turn};

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tandcode_core::{Catalog, Confidence, ValidatedSuggestion};
    use tandcode_llm::{GenerateRequest, Generated, LlmError, TextGenerator};

    pub fn fixture_catalog() -> Catalog {
        Catalog::from_json_str(include_str!("../../../fixtures/catalog.json"))
            .expect("fixture catalog loads")
    }

    /// A validated, uncorrected, high-confidence main suggestion.
    pub fn validated(code: &str, teeth: &[u8]) -> ValidatedSuggestion {
        ValidatedSuggestion {
            code: code.into(),
            original_code: code.into(),
            description: String::new(),
            tooth_numbers: teeth.to_vec(),
            quantity: 1,
            reasoning: String::new(),
            is_companion: false,
            confidence: Confidence::High,
            corrected: false,
            corrections: Vec::new(),
        }
    }

    /// Generator answering from a queue of canned results, in order.
    /// An exhausted queue answers with [`LlmError::EmptyResponse`].
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _request: &GenerateRequest) -> Result<Generated, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let reply = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse));
            reply.map(|text| Generated {
                text,
                tokens_used: 0,
            })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
