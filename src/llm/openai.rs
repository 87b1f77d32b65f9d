//! OpenAI-compatible chat completions client (OpenAI, Groq).
//!
//! Both providers share the `/chat/completions` wire format; only the base
//! URL, key and default model differ.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{http, ClientConfig, Completion, CompletionClient, CompletionError};

pub struct OpenAiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OpenAiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn request_body(&self, instructions: &str, content: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": instructions},
                {"role": "user", "content": content}
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        instructions: &str,
        content: &str,
        timeout: Duration,
    ) -> Result<Completion, CompletionError> {
        let request = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key);
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
    let text = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CompletionError::MalformedResponse("no message content in choices".into()))?
        .to_string();

    let usage = &body["usage"];
    let tokens_used = usage["total_tokens"].as_u64().unwrap_or_else(|| {
        usage["prompt_tokens"].as_u64().unwrap_or(0) + usage["completion_tokens"].as_u64().unwrap_or(0)
    });
    log::info!("[LLM] Tokens used: {}", tokens_used);

    Ok(Completion { text, tokens_used })
}
