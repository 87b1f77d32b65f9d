//! Google Gemini generateContent client.
//!
//! Key differences from Anthropic:
//! - API key in URL query param, not header
//! - Instructions go in `systemInstruction`, limits in `generationConfig`
//! - Text in `candidates[0].content.parts[*].text`
//! - Token usage in `usageMetadata`

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{http, ClientConfig, Completion, CompletionClient, CompletionError};

pub struct GeminiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn request_body(&self, instructions: &str, content: &str) -> Value {
        json!({
            "contents": [
                {"role": "user", "parts": [{"text": content}]}
            ],
            "systemInstruction": {
                "parts": [{"text": instructions}]
            },
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature
            }
        })
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(
        &self,
        instructions: &str,
        content: &str,
        timeout: Duration,
    ) -> Result<Completion, CompletionError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let request = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())]);
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

pub(crate) fn parse_response(body: &Value) -> Result<Completion, CompletionError> {
    if let Some(reason) = body.pointer("/promptFeedback/blockReason").and_then(Value::as_str) {
        return Err(CompletionError::MalformedResponse(format!("prompt blocked: {}", reason)));
    }

    let text: String = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if text.is_empty() {
        return Err(CompletionError::MalformedResponse("no text in candidates".into()));
    }

    let usage = &body["usageMetadata"];
    let tokens_used = usage["totalTokenCount"].as_u64().unwrap_or_else(|| {
        usage["promptTokenCount"].as_u64().unwrap_or(0)
            + usage["candidatesTokenCount"].as_u64().unwrap_or(0)
    });
    log::info!("[LLM] Tokens used: {}", tokens_used);

    Ok(Completion { text, tokens_used })
}
