//! HTTP client for the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{GenerateRequest, Generated, LlmError, TextGenerator};

const API_VERSION: &str = "2023-06-01";

/// Connection settings for [`LlmClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Like `https://api.anthropic.com` (trailing slash is trimmed).
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Transport-level timeout for a single request.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".into(),
            api_key: None,
            model: "claude-sonnet-4-5-20250929".into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed [`TextGenerator`].
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl MessagesResponse {
    fn into_generated(self) -> Result<Generated, LlmError> {
        let text: String = self
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        let tokens_used = self
            .usage
            .map(|u| u.input_tokens + u.output_tokens)
            .unwrap_or(0);
        Ok(Generated { text, tokens_used })
    }
}

impl LlmClient {
    /// Create a client. Fails when no non-blank API key is configured.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingCredentials)?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model,
            timeout: config.timeout,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Http(e)
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Generated, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.user_prompt,
            }],
        };

        info!(url = %url, model = %self.model, "requesting completion");
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: MessagesResponse = serde_json::from_str(&raw)?;
        let generated = parsed.into_generated()?;
        debug!(tokens = generated.tokens_used, "completion received");
        Ok(generated)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost:4000/".into(),
            api_key: key.map(String::from),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = LlmClient::new(config(Some("sk-test"))).unwrap();
        assert_eq!(client.base_url, "http://localhost:4000");
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert!(matches!(
            LlmClient::new(config(None)),
            Err(LlmError::MissingCredentials)
        ));
        assert!(matches!(
            LlmClient::new(config(Some("  "))),
            Err(LlmError::MissingCredentials)
        ));
    }

    #[test]
    fn request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 512,
            temperature: 0.0,
            system: None,
            messages: vec![Message {
                role: "user",
                content: "wkb 36",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "wkb 36");
        assert_eq!(json["max_tokens"], 512);
    }

    #[test]
    fn response_text_blocks_are_joined() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "[{\"code\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "\"V93\"}]"}
            ],
            "usage": {"input_tokens": 100, "output_tokens": 20}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        let generated = parsed.into_generated().unwrap();
        assert_eq!(generated.text, r#"[{"code":"V93"}]"#);
        assert_eq!(generated.tokens_used, 120);
    }

    #[test]
    fn blank_response_is_an_error() {
        let json = r#"{"content": [{"type": "text", "text": "  "}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parsed.into_generated(),
            Err(LlmError::EmptyResponse)
        ));
    }
}
