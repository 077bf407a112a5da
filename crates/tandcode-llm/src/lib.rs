//! LLM boundary: a single text-in / text-out request to a generative model.
//!
//! The coding pipeline only sees the [`TextGenerator`] trait, so every other
//! stage can be exercised without a network. The `http` feature adds
//! [`LlmClient`], a reqwest client for the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{LlmClient, LlmConfig};

#[derive(Error, Debug)]
pub enum LlmError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[cfg(feature = "http")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("model returned no text")]
    EmptyResponse,
    #[error("no API key configured")]
    MissingCredentials,
}

/// A single generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Text returned by the model.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub tokens_used: u32,
}

/// Anything that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Generated, LlmError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

/// Generator that always answers with the same text.
///
/// Used to replay a saved model response through the deterministic stages.
pub struct StaticGenerator {
    text: String,
}

impl StaticGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, _request: &GenerateRequest) -> Result<Generated, LlmError> {
        Ok(Generated {
            text: self.text.clone(),
            tokens_used: 0,
        })
    }

    fn model(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_generator_echoes_text() {
        let generator = StaticGenerator::new("[]");
        let request = GenerateRequest {
            system_prompt: None,
            user_prompt: "comp 36 MOD".into(),
            max_tokens: 16,
            temperature: 0.0,
        };
        let out = generator.generate(&request).await.unwrap();
        assert_eq!(out.text, "[]");
        assert_eq!(generator.model(), "static");
    }

    #[test]
    fn server_error_display() {
        let err = LlmError::Server {
            status: 529,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "server returned 529: overloaded");
    }
}
