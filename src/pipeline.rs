//! Action dispatch pipeline.
//!
//! content + chosen action → detect (if needed) → resolve prompt →
//! one completion call → ActionOutcome → history record.
//!
//! `dispatch` never returns an error: every failure becomes a failed
//! ActionOutcome carrying its ErrorKind. Failures before the completion call
//! (empty input, unsupported action, missing parameter) leave no history
//! record; everything that reached the AI service does.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::detect::ContentDetector;
use crate::error::{DetectError, ErrorKind};
use crate::history::{HistoryStore, NewHistoryRecord};
use crate::llm::{CompletionClient, CompletionError};
use crate::prompts::PromptManager;
use crate::types::{ActionKind, ActionOutcome, ContentType, DetectionResult, Params};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ActionDispatcher {
    detector: ContentDetector,
    prompts: PromptManager,
    client: Arc<dyn CompletionClient>,
    history: Arc<dyn HistoryStore>,
    timeout: Duration,
}

impl ActionDispatcher {
    pub fn new(
        detector: ContentDetector,
        prompts: PromptManager,
        client: Arc<dyn CompletionClient>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            detector,
            prompts,
            client,
            history,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound for a single completion call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn detector(&self) -> &ContentDetector {
        &self.detector
    }

    pub fn prompts(&self) -> &PromptManager {
        &self.prompts
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn detect(&self, text: &str) -> Result<DetectionResult, DetectError> {
        self.detector.detect(text)
    }

    /// Run one action on `content`.
    ///
    /// `detection` is reused when the caller already classified the text
    /// (e.g. to show suggestions); otherwise detection runs here.
    pub async fn dispatch(
        &self,
        content: &str,
        action: &ActionKind,
        params: &Params,
        detection: Option<&DetectionResult>,
    ) -> ActionOutcome {
        // 1. Validate
        if content.trim().is_empty() {
            log::warn!("[DISPATCH] Empty content for action {}", action);
            return ActionOutcome::failed(
                action.clone(),
                ContentType::Unknown,
                ErrorKind::EmptyInput,
                DetectError::EmptyInput.to_string(),
            );
        }

        // 2. Content type
        let content_type = match detection {
            Some(d) => d.content_type,
            None => match self.detector.detect(content) {
                Ok(d) => d.content_type,
                Err(e) => {
                    return ActionOutcome::failed(action.clone(), ContentType::Unknown, e.kind(), e.to_string())
                }
            },
        };

        // 3. Prompt
        let prompt = match self.prompts.resolve(content_type, action, params, content) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("[DISPATCH] {}", e);
                return ActionOutcome::failed(action.clone(), content_type, e.kind(), e.to_string());
            }
        };

        // 4. Completion: exactly one attempt, bounded by the timeout
        let model = self.client.model().to_string();
        log::info!(
            "[DISPATCH] {} on {} ({} chars) via {}",
            action,
            content_type,
            content.chars().count(),
            model
        );
        let start = Instant::now();
        let call = self
            .client
            .complete(&prompt.system_instructions, prompt.content, self.timeout);
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout)),
        };
        let elapsed_ms = start.elapsed().as_millis();

        // 5. Outcome
        let mut outcome = match result {
            Ok(completion) => {
                log::info!(
                    "[DISPATCH] {} succeeded in {}ms, {} tokens",
                    action,
                    elapsed_ms,
                    completion.tokens_used
                );
                ActionOutcome::succeeded(
                    action.clone(),
                    content_type,
                    completion.text,
                    completion.tokens_used,
                    Some(model),
                )
            }
            Err(e) => {
                log::error!("[DISPATCH] {} failed after {}ms: {}", action, elapsed_ms, e);
                ActionOutcome::failed(action.clone(), content_type, e.kind(), e.to_string()).with_model(model)
            }
        };

        // 6. History
        match self.history.append(NewHistoryRecord::from_outcome(content, &outcome)) {
            Ok(id) => outcome.history_id = Some(id),
            Err(e) => log::warn!("[DISPATCH] Could not record history: {}", e),
        }

        outcome
    }
}
