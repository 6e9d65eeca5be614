//! Client for the upstream text-generation API.
//!
//! Single request/response passthrough against the OpenAI Responses API.
//! No retries, no caching, no streaming.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;

/// Bound on a single upstream call so a stalled request cannot hold resources
/// indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const PROVIDER: &str = "openai";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("upstream rate limit exceeded: {details}")]
    RateLimited { details: String },
    #[error("upstream API error ({status}): {details}")]
    Upstream { status: u16, details: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to parse upstream response: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    /// Ask the provider to persist the interaction server-side.
    store: bool,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesReply {
    /// Collect the generated text, tolerating shape drift across API
    /// revisions: prefer the flattened `output_text`, otherwise walk the
    /// message content parts.
    fn into_text(self) -> String {
        if let Some(text) = self.output_text {
            return text;
        }
        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Stateless client for the upstream completion API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Forward a prompt verbatim to the upstream API and return the generated
    /// text.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let request = ResponsesRequest {
            model: &self.model,
            input: prompt,
            store: true,
        };

        let response = self
            .http_client
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "upstream request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let details = response.text().await.unwrap_or_default();
            warn!("upstream rate limit hit");
            return Err(LlmError::RateLimited { details });
        }
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!(status = %status, details = %details, "upstream API error");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let reply: ResponsesReply = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        debug!(model = %self.model, "upstream generation succeeded");
        Ok(reply.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_from(json: &str) -> ResponsesReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prefers_flattened_output_text() {
        let reply = reply_from(r#"{"output_text": "hello", "output": []}"#);
        assert_eq!(reply.into_text(), "hello");
    }

    #[test]
    fn test_walks_content_parts() {
        let reply = reply_from(
            r#"{"output": [{"content": [{"type": "output_text", "text": "hel"},
                                        {"type": "output_text", "text": "lo"}]}]}"#,
        );
        assert_eq!(reply.into_text(), "hello");
    }

    #[test]
    fn test_empty_reply_yields_empty_text() {
        let reply = reply_from("{}");
        assert_eq!(reply.into_text(), "");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let client = LlmClient::new(&LlmConfig {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-5-nano".to_string(),
        });
        match client.generate("hi").await {
            Err(LlmError::Config(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
