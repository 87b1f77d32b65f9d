//! Error taxonomy shared by the pipeline.
//!
//! Every domain error (detection, prompt resolution, completion, history)
//! maps onto one `ErrorKind`. The kind is what a failed `ActionOutcome`
//! carries, so callers can decide whether retrying makes sense without
//! matching on provider-specific messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure categories a caller can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    UnsupportedAction,
    MissingParameter,
    ServiceUnavailable,
    RateLimit,
    Timeout,
    NotFound,
}

impl ErrorKind {
    /// True for failures of the external service; the user may retry.
    /// Local validation failures will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::ServiceUnavailable | ErrorKind::RateLimit | ErrorKind::Timeout
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "empty_input",
            ErrorKind::UnsupportedAction => "unsupported_action",
            ErrorKind::MissingParameter => "missing_parameter",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NotFound => "not_found",
        }
    }

    /// Short user-facing label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "Nothing to process: the clipboard text is empty",
            ErrorKind::UnsupportedAction => "This action is not available for this content",
            ErrorKind::MissingParameter => "The action needs more information",
            ErrorKind::ServiceUnavailable => "The AI service is unavailable",
            ErrorKind::RateLimit => "The AI service is rate limiting requests",
            ErrorKind::Timeout => "The AI service took too long to respond",
            ErrorKind::NotFound => "No such history entry",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content detection failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    #[error("input text is empty or whitespace-only")]
    EmptyInput,
}

impl DetectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectError::EmptyInput => ErrorKind::EmptyInput,
        }
    }
}
