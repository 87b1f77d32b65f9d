//! LLM domain — the AI completion capability behind the dispatcher.
//!
//! Public API:
//!   - CompletionClient — async trait: instructions + content → text + tokens
//!   - client_for       — build the client for a configured provider
//!
//! Providers:
//!   - Anthropic Messages API (anthropic.rs)
//!   - OpenAI-compatible chat completions: OpenAI, Groq (openai.rs)
//!   - Google Gemini generateContent (gemini.rs)
//!
//! Shared:
//!   - http.rs     — request/response plumbing + HTTP error mapping
//!   - provider.rs — provider metadata

pub mod anthropic;
pub mod gemini;
mod http;
pub mod openai;
pub mod provider;

pub use provider::{all_providers, Provider, ProviderInfo};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ErrorKind;

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Completion text plus the tokens the service billed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("AI service rate limit hit: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },
    #[error("AI service did not respond within {:.1}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("unexpected AI service response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompletionError::ServiceUnavailable(_) | CompletionError::MalformedResponse(_) => {
                ErrorKind::ServiceUnavailable
            }
            CompletionError::RateLimited { .. } => ErrorKind::RateLimit,
            CompletionError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// The external AI completion service.
///
/// One call is one attempt: implementations never retry. The timeout is a
/// per-call bound; callers may enforce it again on their side.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        instructions: &str,
        content: &str,
        timeout: Duration,
    ) -> Result<Completion, CompletionError>;

    /// Model identifier recorded alongside results.
    fn model(&self) -> &str;
}

/// Everything a provider client needs to make requests.
#[derive(Clone)]
pub struct ClientConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            base_url: provider.base_url().to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("provider", &self.provider)
            .field("api_key", &format_args!("<{} chars>", self.api_key.len()))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Build the client for a provider configuration.
pub fn client_for(config: ClientConfig) -> Arc<dyn CompletionClient> {
    log::info!("[LLM] Provider: {}", config.provider);
    log::info!("[LLM] Model: {}", config.model);
    match config.provider {
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::new(config)),
        Provider::OpenAi | Provider::Groq => Arc::new(openai::OpenAiClient::new(config)),
        Provider::Gemini => Arc::new(gemini::GeminiClient::new(config)),
    }
}
