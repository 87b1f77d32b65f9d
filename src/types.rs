//! Core domain types — content types, actions, detection results, outcomes.
//!
//! These are the values that flow through the pipeline:
//! raw text → DetectionResult → (user picks an ActionKind) → ActionOutcome.
//! All of them serialize with camelCase field names so a transport adapter
//! can hand them to a frontend unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ErrorKind;

/// Extra template parameters supplied by the caller (e.g. `target_language`).
pub type Params = HashMap<String, String>;

/// Structural classification of a piece of clipboard text.
///
/// Closed set: adding a type means adding a matcher in `detect::heuristics`
/// and a row in the type→actions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Code,
    GitDiff,
    Url,
    Email,
    Json,
    Sql,
    Markdown,
    Tabular,
    Log,
    PlainText,
    Unknown,
}

impl ContentType {
    pub const ALL: [ContentType; 11] = [
        ContentType::Code,
        ContentType::GitDiff,
        ContentType::Url,
        ContentType::Email,
        ContentType::Json,
        ContentType::Sql,
        ContentType::Markdown,
        ContentType::Tabular,
        ContentType::Log,
        ContentType::PlainText,
        ContentType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Code => "code",
            ContentType::GitDiff => "git_diff",
            ContentType::Url => "url",
            ContentType::Email => "email",
            ContentType::Json => "json",
            ContentType::Sql => "sql",
            ContentType::Markdown => "markdown",
            ContentType::Tabular => "tabular",
            ContentType::Log => "log",
            ContentType::PlainText => "plain_text",
            ContentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ContentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown content type: {}", s))
    }
}

/// Identifier of a transformation the AI service can perform.
///
/// String-backed so custom catalogs can introduce new actions; whether an
/// action is valid is decided by the prompt catalog, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ActionKind(Cow<'static, str>);

impl ActionKind {
    pub const FIX_TYPOS: ActionKind = ActionKind::from_static("fix_typos");
    pub const FIX_GRAMMAR: ActionKind = ActionKind::from_static("fix_grammar");
    pub const SUMMARIZE: ActionKind = ActionKind::from_static("summarize");
    pub const TRANSLATE: ActionKind = ActionKind::from_static("translate");
    pub const EXPLAIN: ActionKind = ActionKind::from_static("explain");
    pub const EXPLAIN_CODE: ActionKind = ActionKind::from_static("explain_code");
    pub const EXPLAIN_QUERY: ActionKind = ActionKind::from_static("explain_query");
    pub const EXPLAIN_ERROR: ActionKind = ActionKind::from_static("explain_error");
    pub const ADD_DOCSTRING: ActionKind = ActionKind::from_static("add_docstring");
    pub const ADD_JSDOC: ActionKind = ActionKind::from_static("add_jsdoc");
    pub const GENERATE_TESTS: ActionKind = ActionKind::from_static("generate_tests");
    pub const CONVERT_TO_TYPESCRIPT: ActionKind = ActionKind::from_static("convert_to_typescript");
    pub const GENERATE_COMMIT: ActionKind = ActionKind::from_static("generate_commit");
    pub const SUMMARIZE_CHANGES: ActionKind = ActionKind::from_static("summarize_changes");
    pub const FORMAT: ActionKind = ActionKind::from_static("format");
    pub const FORMAT_JSON: ActionKind = ActionKind::from_static("format_json");
    pub const VALIDATE_JSON: ActionKind = ActionKind::from_static("validate_json");
    pub const FORMAT_SQL: ActionKind = ActionKind::from_static("format_sql");
    pub const EXTRACT_DATA: ActionKind = ActionKind::from_static("extract_data");
    pub const EXTRACT_KEYWORDS: ActionKind = ActionKind::from_static("extract_keywords");
    pub const EXTRACT_LINKS: ActionKind = ActionKind::from_static("extract_links");
    pub const EXTRACT_HEADINGS: ActionKind = ActionKind::from_static("extract_headings");
    pub const CONVERT_TO_HTML: ActionKind = ActionKind::from_static("convert_to_html");
    pub const SUMMARIZE_PAGE: ActionKind = ActionKind::from_static("summarize_page");
    pub const CONVERT_CASE: ActionKind = ActionKind::from_static("convert_case");

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Build an action from user input. Normalizes to trimmed snake_case.
    pub fn new(id: impl AsRef<str>) -> Self {
        let normalized = id.as_ref().trim().to_lowercase().replace(['-', ' '], "_");
        Self(Cow::Owned(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Ids read from catalog or history files get the same normalization as user input
impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ActionKind::new)
    }
}

impl From<&str> for ActionKind {
    fn from(id: &str) -> Self {
        ActionKind::new(id)
    }
}

/// Output of `ContentDetector::detect`. One per call, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub content_type: ContentType,
    /// Relative score in [0, 1] among competing matchers, not a probability.
    pub confidence: f64,
    /// Most relevant first, deduplicated, never empty.
    pub suggested_actions: Vec<ActionKind>,
    /// Programming language, only set for `ContentType::Code`.
    pub language: Option<String>,
    pub line_count: usize,
    pub word_count: usize,
}

/// Typed result of one dispatch attempt.
///
/// Invariant: `result_text` is present iff `success`, `error` iff `!success`.
/// Build through `succeeded` / `failed` to keep it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action: ActionKind,
    pub content_type: ContentType,
    pub success: bool,
    pub result_text: Option<String>,
    pub error: Option<ErrorKind>,
    /// Human-readable detail behind `error`.
    pub error_message: Option<String>,
    pub tokens_used: u64,
    pub model: Option<String>,
    /// Set when the attempt was written to history.
    pub history_id: Option<u64>,
}

impl ActionOutcome {
    pub fn succeeded(
        action: ActionKind,
        content_type: ContentType,
        result_text: String,
        tokens_used: u64,
        model: Option<String>,
    ) -> Self {
        Self {
            action,
            content_type,
            success: true,
            result_text: Some(result_text),
            error: None,
            error_message: None,
            tokens_used,
            model,
            history_id: None,
        }
    }

    /// A failed attempt. Failed attempts never account tokens.
    pub fn failed(
        action: ActionKind,
        content_type: ContentType,
        error: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action,
            content_type,
            success: false,
            result_text: None,
            error: Some(error),
            error_message: Some(message.into()),
            tokens_used: 0,
            model: None,
            history_id: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
