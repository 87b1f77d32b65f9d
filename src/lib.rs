//! ClipboardAI — content classification and action dispatch.
//!
//! Wires together the domains; no business logic lives here.
//!
//!   - detect     — classify text, suggest actions
//!   - prompts    — (content type, action) → instruction template
//!   - llm        — AI completion providers
//!   - pipeline   — ActionDispatcher (detect → prompt → complete → history)
//!   - history    — dispatch records and usage stats
//!   - settings   — env / .env configuration, provider resolution
//!   - cli        — command-line adapter used by the binary

pub mod cli;
pub mod detect;
pub mod error;
pub mod history;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod settings;
pub mod types;

pub use detect::{ContentDetector, PatternLibrary};
pub use error::{DetectError, ErrorKind};
pub use history::{HistoryRecord, HistoryStore, InMemoryHistoryStore, JsonFileHistoryStore};
pub use llm::{Completion, CompletionClient, CompletionError};
pub use pipeline::ActionDispatcher;
pub use prompts::{PromptCatalog, PromptManager, RenderedPrompt};
pub use types::{ActionKind, ActionOutcome, ContentType, DetectionResult, Params};
