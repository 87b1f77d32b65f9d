//! Anthropic Messages API client.
//!
//! - API key in `x-api-key` header, pinned `anthropic-version`
//! - Instructions go in the top-level `system` field, content as the single
//!   user message
//! - Tokens = `usage.input_tokens + usage.output_tokens`

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{http, ClientConfig, Completion, CompletionClient, CompletionError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AnthropicClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn request_body(&self, instructions: &str, content: &str) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": instructions,
            "messages": [{"role": "user", "content": content}]
        })
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(
        &self,
        instructions: &str,
        content: &str,
        timeout: Duration,
    ) -> Result<Completion, CompletionError> {
        let request = self
            .http
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let body = http::post_json(
            request,
            &self.request_body(instructions, content),
            timeout,
            self.config.provider,
        )
        .await?;
        parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Concatenate every text block of a Messages API response.
pub(crate) fn parse_response(body: &Value) -> Result<Completion, CompletionError> {
    let blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| CompletionError::MalformedResponse("missing content array".into()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(CompletionError::MalformedResponse("no text content".into()));
    }

    let usage = &body["usage"];
    let tokens_used = usage["input_tokens"].as_u64().unwrap_or(0)
        + usage["output_tokens"].as_u64().unwrap_or(0);
    log::info!("[LLM] Tokens used: {}", tokens_used);

    Ok(Completion { text, tokens_used })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    #[test]
    fn parses_text_and_usage() {
        let body = json!({
            "content": [
                {"type": "text", "text": "def add(a,b):\n"},
                {"type": "text", "text": "  return a+b"}
            ],
            "usage": {"input_tokens": 40, "output_tokens": 12}
        });
        let completion = parse_response(&body).unwrap();
        assert_eq!(completion.text, "def add(a,b):\n  return a+b");
        assert_eq!(completion.tokens_used, 52);
    }

    #[test]
    fn missing_text_is_malformed() {
        let body = json!({"content": [{"type": "tool_use", "id": "x"}]});
        assert!(matches!(parse_response(&body), Err(CompletionError::MalformedResponse(_))));
        assert!(parse_response(&json!({"id": "msg"})).is_err());
    }

    #[test]
    fn request_keeps_content_out_of_system() {
        let client = AnthropicClient::new(ClientConfig::new(Provider::Anthropic, "key"));
        let body = client.request_body("Fix typos.", "teh text");
        assert_eq!(body["system"], "Fix typos.");
        assert_eq!(body["messages"][0]["content"], "teh text");
        assert_eq!(body["max_tokens"], 2000);
    }
}
